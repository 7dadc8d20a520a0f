//! Types that mirror the dashboard API's JSON schema.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AgentStatus {
    Active,
    #[default]
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// One row of `/server_dashboard/data`: latest heartbeat per host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentLogRecord {
    pub agent_uuid: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub os_name: Option<String>,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub last_heartbeat_str: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub is_internet_facing: bool,
}

impl AgentLogRecord {
    pub fn hostname(&self) -> &str {
        self.hostname.as_deref().unwrap_or("unknown")
    }

    pub fn last_heartbeat(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.last_heartbeat_str, "%Y-%m-%d %H:%M:%S").ok()
    }
}

/// One row of `/api/assets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub hostname: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default)]
    pub memory_gb: Option<f64>,
    #[serde(default)]
    pub disk_gb: Option<f64>,
    #[serde(default)]
    pub ip_addresses: Option<String>,
    #[serde(default)]
    pub collected_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<Priority>,
}

impl AssetRecord {
    /// `collected_at` is an ISO timestamp, either RFC 3339 or naive (assumed UTC).
    pub fn collected_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.collected_at) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.collected_at, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|n| n.and_utc())
    }

    pub fn ip_list(&self) -> Vec<&str> {
        self.ip_addresses
            .as_deref()
            .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Response of `/get_link/{os}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub url: String,
    pub sha256: String,
}

/// Summary fields that ride along with the monitoring page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitoringSummary {
    pub total_agents: u64,
    pub unique_ips: u64,
    pub latest_heartbeat: Option<String>,
}

/// Error body FastAPI-style servers send with 4xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub detail: Option<String>,
}
