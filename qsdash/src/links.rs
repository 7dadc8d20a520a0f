//! Agent download links: per-OS link/checksum lookups and downloads.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::FetchError;
use crate::fetcher::endpoint;
use crate::transport::Transport;
use crate::types::{ErrorDetail, LinkInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OsKey {
    Windows,
    Linux,
    MacOs,
}

impl OsKey {
    pub const ALL: [OsKey; 3] = [OsKey::Windows, OsKey::Linux, OsKey::MacOs];

    /// Path segment the server knows this OS by.
    pub fn api_name(self) -> &'static str {
        match self {
            OsKey::Windows => "windows",
            OsKey::Linux => "ubuntu",
            OsKey::MacOs => "mac",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            OsKey::Windows => "Windows",
            OsKey::Linux => "Linux",
            OsKey::MacOs => "macOS",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            OsKey::Windows => "QS-Setup.exe",
            OsKey::Linux => "qs-agent_1.0.0_all.deb",
            OsKey::MacOs => "mac_agent",
        }
    }
}

impl fmt::Display for OsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

pub const AGENT_VERSION: &str = "v2.4.1";
pub const AGENT_RELEASE_DATE: &str = "2025-09-28";

/// What an OS card shows in its checksum line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChecksumDisplay {
    #[default]
    Fetching,
    Available(String),
    Unavailable,
}

impl fmt::Display for ChecksumDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumDisplay::Fetching => f.write_str("Fetching..."),
            ChecksumDisplay::Available(sha) => {
                let short: String = sha.chars().take(15).collect();
                write!(f, "{short}...")
            }
            ChecksumDisplay::Unavailable => f.write_str("Unavailable"),
        }
    }
}

impl From<&Result<LinkInfo, FetchError>> for ChecksumDisplay {
    fn from(r: &Result<LinkInfo, FetchError>) -> Self {
        match r {
            Ok(info) => ChecksumDisplay::Available(info.sha256.clone()),
            Err(_) => ChecksumDisplay::Unavailable,
        }
    }
}

/// Where a downloaded agent went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub key: OsKey,
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// Receives a resolved download URL. The terminal counterpart of navigating a browser to it.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn open(&self, key: OsKey, url: &Url, link: &LinkInfo) -> Result<DownloadReceipt, FetchError>;
}

#[derive(Clone)]
pub struct LinkLookup {
    base: Url,
    transport: Arc<dyn Transport>,
}

impl LinkLookup {
    pub fn new(base: Url, transport: Arc<dyn Transport>) -> Self {
        Self { base, transport }
    }

    pub async fn fetch_link_info(&self, key: OsKey) -> Result<LinkInfo, FetchError> {
        let url = endpoint(&self.base, &["get_link", key.api_name()])?;
        let response = self.transport.get(url.as_str()).await?;
        if response.status == 404 {
            let detail = serde_json::from_slice::<ErrorDetail>(&response.body)
                .ok()
                .and_then(|d| d.detail)
                .unwrap_or_else(|| "File not found on server.".to_string());
            return Err(FetchError::NotFound(detail));
        }
        if !response.is_success() {
            return Err(FetchError::Network(format!(
                "Download request failed. (HTTP {})",
                response.status
            )));
        }
        let info: LinkInfo = serde_json::from_slice(&response.body)?;
        tracing::debug!("link for {}: {}", key, info.url);
        Ok(info)
    }

    /// Checksum lookup for one key, as a `'static` task.
    pub fn checksum_task(&self, key: OsKey) -> impl Future<Output = (OsKey, ChecksumDisplay)> + Send + 'static {
        let this = self.clone();
        async move {
            let res = this.fetch_link_info(key).await;
            if let Err(e) = &res {
                tracing::warn!("checksum for {} unavailable: {}", key.display_name(), e);
            }
            (key, ChecksumDisplay::from(&res))
        }
    }

    /// Look up every key concurrently. Each key only ever fills its own slot.
    pub async fn fetch_all(&self) -> BTreeMap<OsKey, ChecksumDisplay> {
        join_all(OsKey::ALL.iter().map(|&k| self.checksum_task(k)))
            .await
            .into_iter()
            .collect()
    }

    /// Re-fetch the link for `key` and hand it to `sink`.
    pub async fn trigger_download(
        &self,
        key: OsKey,
        sink: &dyn DownloadSink,
    ) -> Result<DownloadReceipt, FetchError> {
        let link = self.fetch_link_info(key).await?;
        // the server normally sends an absolute URL; accept a relative one too
        let url = Url::parse(&link.url)
            .or_else(|_| self.base.join(&link.url))
            .map_err(|e| FetchError::Parse(format!("download url '{}': {e}", link.url)))?;
        sink.open(key, &url, &link).await
    }
}

/// Saves the agent into a directory and checks it against the advertised SHA-256.
pub struct FileDownloader {
    transport: Arc<dyn Transport>,
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(transport: Arc<dyn Transport>, dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            dir: dir.into(),
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[async_trait]
impl DownloadSink for FileDownloader {
    async fn open(&self, key: OsKey, url: &Url, link: &LinkInfo) -> Result<DownloadReceipt, FetchError> {
        let response = self.transport.get(url.as_str()).await?;
        if !response.is_success() {
            let detail = serde_json::from_slice::<ErrorDetail>(&response.body)
                .ok()
                .and_then(|d| d.detail)
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return Err(FetchError::Network(format!("Download failed: {detail}")));
        }

        let actual = sha256_hex(&response.body);
        if !actual.eq_ignore_ascii_case(link.sha256.trim()) {
            return Err(FetchError::ChecksumMismatch {
                expected: link.sha256.clone(),
                actual,
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(key.file_name());
        tokio::fs::write(&path, &response.body).await?;
        tracing::info!("saved {} agent to {}", key.display_name(), path.display());
        Ok(DownloadReceipt {
            key,
            path,
            bytes: response.body.len() as u64,
            sha256: actual,
        })
    }
}
