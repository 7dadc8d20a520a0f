//! Paged retrieval of remote collections.
//!
//! A [`Resource`] describes one list endpoint (path, item type, how to read its body);
//! [`PagedCollectionFetcher`] issues `GET {base}{path}?page=N&limit=M` and normalises the
//! reply into a [`PageResult`]. The fetcher holds no per-resource state: applying a
//! result is the caller's job (see `navigator`).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use crate::error::FetchError;
use crate::transport::Transport;
use crate::types::{AgentLogRecord, AssetRecord, MonitoringSummary};

/// Identifies one fetch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub resource: &'static str,
    pub page_number: u32,
    pub page_size: u32,
}

/// One server response to a paginated list request, items in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T, M = ()> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub meta: M,
}

/// Body fields as read off the wire, before defaults are applied.
#[derive(Debug)]
pub struct RawPage<T, M> {
    pub items: Option<Vec<T>>,
    pub total_pages: Option<u32>,
    pub meta: M,
}

impl<T, M: Default> Default for RawPage<T, M> {
    fn default() -> Self {
        Self {
            items: None,
            total_pages: None,
            meta: M::default(),
        }
    }
}

pub trait Resource: Send + Sync + 'static {
    type Item: Clone + std::fmt::Debug + Send + Sync + 'static;
    type Meta: Clone + std::fmt::Debug + Default + Send + Sync + 'static;

    const NAME: &'static str;
    const PATH: &'static [&'static str];
    /// User-facing message when a page cannot be loaded.
    const FAILURE: &'static str;

    fn decode(body: Value) -> Result<RawPage<Self::Item, Self::Meta>, FetchError>;
}

/// Agent monitoring logs: latest heartbeat per host.
#[derive(Debug, Clone, Copy)]
pub struct AgentLogs;

impl Resource for AgentLogs {
    type Item = AgentLogRecord;
    type Meta = MonitoringSummary;

    const NAME: &'static str = "agent_logs";
    const PATH: &'static [&'static str] = &["server_dashboard", "data"];
    const FAILURE: &'static str = "Failed to fetch monitoring data.";

    fn decode(body: Value) -> Result<RawPage<AgentLogRecord, MonitoringSummary>, FetchError> {
        let Value::Object(obj) = body else {
            tracing::warn!("{}: response is not a JSON object; treating as empty", Self::NAME);
            return Ok(RawPage::default());
        };
        Ok(RawPage {
            items: field(&obj, "logs")?,
            total_pages: field(&obj, "total_pages")?,
            meta: MonitoringSummary {
                total_agents: field(&obj, "total_downloads")?.unwrap_or(0),
                unique_ips: field(&obj, "unique_ips")?.unwrap_or(0),
                latest_heartbeat: field::<String>(&obj, "latest_download_time")?
                    .filter(|s| s != "N/A"),
            },
        })
    }
}

/// Asset inventory.
#[derive(Debug, Clone, Copy)]
pub struct Assets;

impl Resource for Assets {
    type Item = AssetRecord;
    type Meta = ();

    const NAME: &'static str = "assets";
    const PATH: &'static [&'static str] = &["api", "assets"];
    const FAILURE: &'static str = "Failed to fetch asset data.";

    fn decode(body: Value) -> Result<RawPage<AssetRecord, ()>, FetchError> {
        match body {
            Value::Object(obj) => Ok(RawPage {
                items: field(&obj, "assets")?,
                total_pages: field(&obj, "total_pages")?,
                meta: (),
            }),
            // Older servers answered with a bare array; kept as a compatibility path.
            Value::Array(_) => {
                tracing::warn!(
                    "{}: server sent a bare array (deprecated shape); assuming a single page",
                    Self::NAME
                );
                let items: Vec<AssetRecord> = serde_json::from_value(body)?;
                Ok(RawPage {
                    items: Some(items),
                    total_pages: Some(1),
                    meta: (),
                })
            }
            _ => {
                tracing::warn!("{}: response is not a JSON object; treating as empty", Self::NAME);
                Ok(RawPage::default())
            }
        }
    }
}

/// Absent and `null` both read as `None`; a present value of the wrong type is a parse error.
fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Result<Option<T>, FetchError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => T::deserialize(v)
            .map(Some)
            .map_err(|e| FetchError::Parse(format!("field '{key}': {e}"))),
    }
}

/// Append path segments to `base`, keeping any path prefix it already has.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidRequest(format!("base URL '{base}' cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub struct PagedCollectionFetcher {
    base: Url,
    transport: Arc<dyn Transport>,
}

impl PagedCollectionFetcher {
    pub fn new(base: Url, transport: Arc<dyn Transport>) -> Self {
        Self { base, transport }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn page_url<R: Resource>(&self, page_number: u32, page_size: u32) -> Result<Url, FetchError> {
        let mut url = endpoint(&self.base, R::PATH)?;
        url.query_pairs_mut()
            .append_pair("page", &page_number.to_string())
            .append_pair("limit", &page_size.to_string());
        Ok(url)
    }

    /// Fetch one page of `R`. Never returns more than `page_size` items.
    pub async fn fetch_page<R: Resource>(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<PageResult<R::Item, R::Meta>, FetchError> {
        if page_number < 1 {
            return Err(FetchError::InvalidRequest(format!(
                "page number must be >= 1, got {page_number}"
            )));
        }
        if page_size == 0 {
            return Err(FetchError::InvalidRequest("page size must be > 0".into()));
        }

        let url = self.page_url::<R>(page_number, page_size)?;
        let response = self.transport.get(url.as_str()).await.map_err(|e| match e {
            FetchError::Network(detail) => FetchError::Network(format!("{} ({detail})", R::FAILURE)),
            other => other,
        })?;
        if !response.is_success() {
            return Err(FetchError::Network(format!(
                "{} (HTTP {})",
                R::FAILURE,
                response.status
            )));
        }

        let body: Value = serde_json::from_slice(&response.body)?;
        let raw = R::decode(body)?;

        let mut items = raw.items.unwrap_or_default();
        let total_pages = raw.total_pages.filter(|&n| n >= 1).unwrap_or(1);
        if items.len() > page_size as usize {
            tracing::warn!(
                "{}: server returned {} items for limit {}; truncating",
                R::NAME,
                items.len(),
                page_size
            );
            items.truncate(page_size as usize);
        }

        tracing::debug!(
            "{}: page {}/{} -> {} items",
            R::NAME,
            page_number,
            total_pages,
            items.len()
        );
        Ok(PageResult {
            items,
            total_pages,
            meta: raw.meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, MockTransport};

    fn fetcher(mock: MockTransport) -> PagedCollectionFetcher {
        PagedCollectionFetcher::new(Url::parse("http://localhost:8000").unwrap(), Arc::new(mock))
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            body: body.as_bytes().to_vec(),
        }
    }

    fn asset_json(i: usize) -> String {
        format!(r#"{{"hostname":"host-{i:03}","os":"Ubuntu","collected_at":"2025-09-28T10:00:00"}}"#)
    }

    #[test]
    fn page_url_keeps_base_prefix() {
        let f = PagedCollectionFetcher::new(
            Url::parse("https://soc.example.com/backend/").unwrap(),
            Arc::new(MockTransport::new()),
        );
        let url = f.page_url::<AgentLogs>(3, 50).unwrap();
        assert_eq!(
            url.as_str(),
            "https://soc.example.com/backend/server_dashboard/data?page=3&limit=50"
        );
    }

    #[tokio::test]
    async fn requests_page_and_limit() {
        let mut mock = MockTransport::new();
        mock.expect_get()
            .withf(|url| url.ends_with(":8000/api/assets?page=2&limit=50"))
            .times(1)
            .returning(|_| Box::pin(async { Ok(ok(r#"{"assets":[],"total_pages":5}"#)) }));
        let page = fetcher(mock).fetch_page::<Assets>(2, 50).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 5);
    }

    #[tokio::test]
    async fn missing_fields_default_to_empty_single_page() {
        let mut mock = MockTransport::new();
        mock.expect_get()
            .returning(|_| Box::pin(async { Ok(ok(r#"{"logs":null,"total_pages":0}"#)) }));
        let page = fetcher(mock).fetch_page::<AgentLogs>(1, 50).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.meta, MonitoringSummary::default());
    }

    #[tokio::test]
    async fn monitoring_summary_is_read() {
        let mut mock = MockTransport::new();
        mock.expect_get().returning(|_| {
            Box::pin(async {
                Ok(ok(r#"{"logs":[{"agent_uuid":"u1","status":"Inactive","last_heartbeat_str":"2025-09-28 01:02:03"}],
                    "total_pages":1,"total_downloads":1,"unique_ips":1,"latest_download_time":"2025-09-28 01:02:03"}"#))
            })
        });
        let page = fetcher(mock).fetch_page::<AgentLogs>(1, 50).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.meta.total_agents, 1);
        assert_eq!(page.meta.latest_heartbeat.as_deref(), Some("2025-09-28 01:02:03"));
    }

    #[tokio::test]
    async fn never_returns_more_than_page_size() {
        let mut mock = MockTransport::new();
        mock.expect_get().returning(|_| {
            let items: Vec<String> = (0..12).map(asset_json).collect();
            let body = format!(r#"{{"assets":[{}],"total_pages":1}}"#, items.join(","));
            Box::pin(async move { Ok(ok(&body)) })
        });
        let f = fetcher(mock);
        for size in [1u32, 5, 12, 50] {
            let page = f.fetch_page::<Assets>(1, size).await.unwrap();
            assert!(page.items.len() <= size as usize, "size {size}");
        }
    }

    #[tokio::test]
    async fn bare_array_is_accepted_as_single_page() {
        let mut mock = MockTransport::new();
        mock.expect_get().returning(|_| {
            let body = format!("[{},{}]", asset_json(1), asset_json(2));
            Box::pin(async move { Ok(ok(&body)) })
        });
        let page = fetcher(mock).fetch_page::<Assets>(1, 50).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items[0].hostname, "host-001");
    }

    #[tokio::test]
    async fn non_2xx_is_network_error_with_resource_message() {
        let mut mock = MockTransport::new();
        mock.expect_get().returning(|_| {
            Box::pin(async {
                Ok(HttpResponse {
                    status: 500,
                    body: b"oops".to_vec(),
                })
            })
        });
        let err = fetcher(mock).fetch_page::<AgentLogs>(1, 50).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Network("Failed to fetch monitoring data. (HTTP 500)".into())
        );
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let mut mock = MockTransport::new();
        mock.expect_get()
            .returning(|_| Box::pin(async { Ok(ok("{\"assets\": [")) }));
        let err = fetcher(mock).fetch_page::<Assets>(1, 50).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn wrong_item_shape_is_parse_error() {
        let mut mock = MockTransport::new();
        mock.expect_get()
            .returning(|_| Box::pin(async { Ok(ok(r#"{"assets":"nope"}"#)) }));
        let err = fetcher(mock).fetch_page::<Assets>(1, 50).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(ref m) if m.contains("assets")), "{err:?}");
    }

    #[tokio::test]
    async fn rejects_invalid_requests_without_network() {
        let mut mock = MockTransport::new();
        mock.expect_get().times(0);
        let f = fetcher(mock);
        assert!(matches!(
            f.fetch_page::<Assets>(0, 50).await,
            Err(FetchError::InvalidRequest(_))
        ));
        assert!(matches!(
            f.fetch_page::<Assets>(1, 0).await,
            Err(FetchError::InvalidRequest(_))
        ));
    }
}
