//! API connection settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::fetcher::PagedCollectionFetcher;
use crate::links::LinkLookup;
use crate::transport::{ReqwestTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "QSDASH_API_URL";
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Largest `limit` the API accepts.
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: Url,
    pub page_size: u32,
    pub timeout: Duration,
    pub tls_ca: Option<PathBuf>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            tls_ca: None,
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, ConfigError> {
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::PageSize {
                got: page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        self.page_size = page_size;
        Ok(self)
    }

    pub fn with_tls_ca(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.tls_ca = path.map(Into::into);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// reqwest transport, trusting the configured CA in addition to the built-in roots.
    pub fn transport(&self) -> Result<Arc<dyn Transport>, ConfigError> {
        let pem = match &self.tls_ca {
            Some(path) => Some(std::fs::read(path).map_err(|source| ConfigError::TlsCa {
                path: path.display().to_string(),
                source,
            })?),
            None => None,
        };
        Ok(Arc::new(ReqwestTransport::new(self.timeout, pem.as_deref())?))
    }

    pub fn fetcher(&self, transport: Arc<dyn Transport>) -> Arc<PagedCollectionFetcher> {
        Arc::new(PagedCollectionFetcher::new(self.base_url.clone(), transport))
    }

    pub fn link_lookup(&self, transport: Arc<dyn Transport>) -> LinkLookup {
        LinkLookup::new(self.base_url.clone(), transport)
    }
}

pub fn parse_base_url(s: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(s.trim()).map_err(|e| ConfigError::InvalidUrl(s.to_string(), e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
