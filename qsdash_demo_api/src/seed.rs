//! Deterministic demo records.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::types::{AgentRow, AssetRow};

const OSES: [(&str, &str); 4] = [
    ("Windows", "11 23H2"),
    ("Ubuntu", "22.04"),
    ("macOS", "14.5"),
    ("Windows Server", "2022"),
];
const DEPARTMENTS: [&str; 5] = ["Finance", "Engineering", "HR", "Operations", "Sales"];
const PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];
const CPUS: [&str; 3] = [
    "Intel Core i7-1265U",
    "AMD Ryzen 7 PRO 6850U",
    "Apple M2",
];

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap_or_default()
}

/// `n` agents, newest heartbeat first. Every third one is offline.
pub fn agents(n: usize) -> Vec<AgentRow> {
    (0..n)
        .map(|i| {
            let (os, _) = OSES[i % OSES.len()];
            let hb = base_time() - Duration::seconds(i as i64 * 97);
            AgentRow {
                agent_uuid: format!("00000000-0000-4000-8000-{i:012}"),
                hostname: format!("ws-{i:03}"),
                ip_address: format!("10.0.{}.{}", i / 250, i % 250 + 1),
                os_name: os.to_string(),
                machine_type: if i % 4 == 3 { "server" } else { "workstation" }.to_string(),
                status: if i % 3 == 2 { "Inactive" } else { "Active" },
                last_heartbeat_str: hb.format("%Y-%m-%d %H:%M:%S").to_string(),
                priority: PRIORITIES[i % PRIORITIES.len()],
                department: DEPARTMENTS[i % DEPARTMENTS.len()].to_string(),
                is_internet_facing: i % 7 == 0,
            }
        })
        .collect()
}

/// `n` assets, ordered by hostname.
pub fn assets(n: usize) -> Vec<AssetRow> {
    (0..n)
        .map(|i| {
            let (os, ver) = OSES[i % OSES.len()];
            let seen = base_time() - Duration::minutes(i as i64 * 13);
            AssetRow {
                hostname: format!("asset-{i:04}"),
                username: format!("user{}", i % 40),
                os: os.to_string(),
                os_version: ver.to_string(),
                cpu: CPUS[i % CPUS.len()].to_string(),
                memory_gb: [8.0, 16.0, 32.0, 64.0][i % 4],
                disk_gb: [256.0, 512.0, 1024.0][i % 3],
                uptime_seconds: (i as u64 * 3_601) % 2_592_000,
                ip_addresses: format!("192.168.{}.{}, fe80::{:x}", i / 200, i % 200 + 10, i + 1),
                collected_at: seen.format("%Y-%m-%dT%H:%M:%S").to_string(),
                risk: PRIORITIES[(i + 1) % PRIORITIES.len()],
            }
        })
        .collect()
}
