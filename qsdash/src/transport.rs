//! HTTP transport abstraction so fetchers can be tested without a server.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ConfigError, FetchError};

/// Status and raw body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Send a GET request. Only transport-level failures are errors; any status is Ok.
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Production transport on reqwest (rustls backend).
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, tls_ca_pem: Option<&[u8]>) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("qsdash/", env!("CARGO_PKG_VERSION")));
        if let Some(pem) = tls_ca_pem {
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(pem)?);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("GET {url} failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(format!("reading response body: {e}")))?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
