//! Typed filter and sort over fetched items.
//!
//! Filters and sort keys are enums over the concrete record types, so a key that does
//! not exist cannot be expressed.

use std::cmp::Ordering;

use crate::types::{AgentLogRecord, AgentStatus, AssetRecord, Priority};

/// Predicate + comparator applied to the items of the current page.
pub trait ItemView<T>: Clone + Default + Send + Sync + 'static {
    fn matches(&self, item: &T) -> bool;
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Filtered, then stably sorted. With an `Unsorted` key server order is kept.
    fn apply<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        let mut out: Vec<&T> = items.iter().filter(|i| self.matches(i)).collect();
        out.sort_by(|a, b| self.compare(a, b));
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn apply(self, o: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => o,
            SortOrder::Desc => o.reverse(),
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentFilter {
    #[default]
    All,
    Active,
    Offline,
}

impl AgentFilter {
    pub fn next(self) -> Self {
        match self {
            AgentFilter::All => AgentFilter::Active,
            AgentFilter::Active => AgentFilter::Offline,
            AgentFilter::Offline => AgentFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentFilter::All => "all",
            AgentFilter::Active => "active",
            AgentFilter::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentSort {
    /// Server order (latest heartbeat first).
    #[default]
    Unsorted,
    Heartbeat,
    Hostname,
    Priority,
    Department,
    InternetFacing,
}

impl AgentSort {
    pub fn next(self) -> Self {
        match self {
            AgentSort::Unsorted => AgentSort::Heartbeat,
            AgentSort::Heartbeat => AgentSort::Hostname,
            AgentSort::Hostname => AgentSort::Priority,
            AgentSort::Priority => AgentSort::Department,
            AgentSort::Department => AgentSort::InternetFacing,
            AgentSort::InternetFacing => AgentSort::Unsorted,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentSort::Unsorted => "server",
            AgentSort::Heartbeat => "heartbeat",
            AgentSort::Hostname => "hostname",
            AgentSort::Priority => "priority",
            AgentSort::Department => "department",
            AgentSort::InternetFacing => "internet-facing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgentView {
    pub filter: AgentFilter,
    pub sort: AgentSort,
    pub order: SortOrder,
}

impl ItemView<AgentLogRecord> for AgentView {
    fn matches(&self, a: &AgentLogRecord) -> bool {
        match self.filter {
            AgentFilter::All => true,
            AgentFilter::Active => a.status == AgentStatus::Active,
            AgentFilter::Offline => a.status == AgentStatus::Inactive,
        }
    }

    fn compare(&self, a: &AgentLogRecord, b: &AgentLogRecord) -> Ordering {
        let prio = |r: &AgentLogRecord| r.priority.unwrap_or_default();
        let o = match self.sort {
            AgentSort::Unsorted => return Ordering::Equal,
            AgentSort::Heartbeat => a.last_heartbeat().cmp(&b.last_heartbeat()),
            AgentSort::Hostname => a.hostname().cmp(b.hostname()),
            AgentSort::Priority => prio(a).cmp(&prio(b)),
            AgentSort::Department => a.department.cmp(&b.department),
            AgentSort::InternetFacing => a.is_internet_facing.cmp(&b.is_internet_facing),
        };
        self.order.apply(o)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetSort {
    /// Server order (hostname ascending).
    #[default]
    Unsorted,
    Hostname,
    Os,
    Memory,
    Disk,
    CollectedAt,
}

impl AssetSort {
    pub fn next(self) -> Self {
        match self {
            AssetSort::Unsorted => AssetSort::Hostname,
            AssetSort::Hostname => AssetSort::Os,
            AssetSort::Os => AssetSort::Memory,
            AssetSort::Memory => AssetSort::Disk,
            AssetSort::Disk => AssetSort::CollectedAt,
            AssetSort::CollectedAt => AssetSort::Unsorted,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetSort::Unsorted => "server",
            AssetSort::Hostname => "hostname",
            AssetSort::Os => "os",
            AssetSort::Memory => "memory",
            AssetSort::Disk => "disk",
            AssetSort::CollectedAt => "last seen",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssetView {
    pub sort: AssetSort,
    pub order: SortOrder,
    /// Case-insensitive hostname substring.
    pub search: Option<String>,
}

impl ItemView<AssetRecord> for AssetView {
    fn matches(&self, a: &AssetRecord) -> bool {
        match self.search.as_deref() {
            Some(q) if !q.is_empty() => a.hostname.to_lowercase().contains(&q.to_lowercase()),
            _ => true,
        }
    }

    fn compare(&self, a: &AssetRecord, b: &AssetRecord) -> Ordering {
        let f = |v: Option<f64>| v.unwrap_or(0.0);
        let o = match self.sort {
            AssetSort::Unsorted => return Ordering::Equal,
            AssetSort::Hostname => a.hostname.cmp(&b.hostname),
            AssetSort::Os => a.os.cmp(&b.os),
            AssetSort::Memory => f(a.memory_gb).total_cmp(&f(b.memory_gb)),
            AssetSort::Disk => f(a.disk_gb).total_cmp(&f(b.disk_gb)),
            AssetSort::CollectedAt => a.collected_at().cmp(&b.collected_at()),
        };
        self.order.apply(o)
    }
}
