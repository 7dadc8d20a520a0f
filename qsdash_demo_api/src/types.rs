//! JSON shapes served to the dashboard client.
//! Keep this module minimal and stable: it defines the wire format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Clone)]
pub struct AgentRow {
    pub agent_uuid: String,
    pub hostname: String,
    pub ip_address: String,
    pub os_name: String,
    pub machine_type: String,
    pub status: &'static str,
    pub last_heartbeat_str: String,
    pub priority: &'static str,
    pub department: String,
    pub is_internet_facing: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct AssetRow {
    pub hostname: String,
    pub username: String,
    pub os: String,
    pub os_version: String,
    pub cpu: String,
    pub memory_gb: f64,
    pub disk_gb: f64,
    pub uptime_seconds: u64,
    pub ip_addresses: String,
    pub collected_at: String,
    pub risk: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MonitoringPage {
    pub logs: Vec<AgentRow>,
    pub total_downloads: usize,
    pub unique_ips: usize,
    pub latest_download_time: String,
    pub current_page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
pub struct AssetPage {
    pub assets: Vec<AssetRow>,
    pub current_page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub url: String,
    pub sha256: String,
}

#[derive(Debug, Serialize)]
pub struct Detail {
    pub detail: String,
}

/// `?page=&limit=`; both optional, validated by the handler.
#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TokenQuery {
    pub token: Option<String>,
}
