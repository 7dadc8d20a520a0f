//! Page navigation controller: owns the fetch state of one resource.
//!
//! Every fetch is tagged with a token from a per-navigator counter. A completion is only
//! applied when its token is the latest one issued, so when requests overlap the most
//! recently *issued* request decides what is shown, regardless of arrival order.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::FetchError;
use crate::fetcher::{PageRequest, PageResult, PagedCollectionFetcher, Resource};
use crate::notify::NotificationCenter;
use crate::view::ItemView;

/// Client-held record of the most recent retrieval for one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T, M> {
    pub current_page: u32,
    pub items: Vec<T>,
    pub total_pages: u32,
    pub is_loading: bool,
    pub last_error: Option<FetchError>,
    pub meta: M,
}

impl<T, M: Default> Default for FetchState<T, M> {
    fn default() -> Self {
        Self {
            current_page: 1,
            items: Vec::new(),
            total_pages: 1,
            is_loading: false,
            last_error: None,
            meta: M::default(),
        }
    }
}

/// A fetch that has been issued but not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFetch {
    pub token: u64,
    pub request: PageRequest,
}

impl PendingFetch {
    pub async fn run<R: Resource>(self, fetcher: Arc<PagedCollectionFetcher>) -> FetchOutcome<R> {
        let result = fetcher
            .fetch_page::<R>(self.request.page_number, self.request.page_size)
            .await;
        FetchOutcome {
            token: self.token,
            request: self.request,
            result,
        }
    }
}

pub struct FetchOutcome<R: Resource> {
    pub token: u64,
    pub request: PageRequest,
    pub result: Result<PageResult<R::Item, R::Meta>, FetchError>,
}

impl<R: Resource> std::fmt::Debug for FetchOutcome<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOutcome")
            .field("token", &self.token)
            .field("request", &self.request)
            .field("ok", &self.result.is_ok())
            .finish()
    }
}

/// What happened to a completion handed to [`PageNavigator::complete`].
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied,
    /// A newer request was issued after this one; the result was dropped.
    Stale,
    /// Latest request failed; state kept, error recorded.
    Failed(FetchError),
}

impl Completion {
    /// Surface a failure as a transient notification.
    pub fn notify(&self, center: &mut NotificationCenter) {
        if let Completion::Failed(e) = self {
            center.error(e.to_string());
        }
    }
}

pub struct PageNavigator<R: Resource, V: ItemView<R::Item>> {
    fetcher: Arc<PagedCollectionFetcher>,
    page_size: u32,
    state: FetchState<R::Item, R::Meta>,
    view: V,
    latest_token: u64,
    /// Page of the latest issued request. Paging steps from here so keypresses made
    /// before a reply arrives are not lost.
    requested_page: u32,
    _resource: PhantomData<R>,
}

impl<R: Resource, V: ItemView<R::Item>> PageNavigator<R, V> {
    pub fn new(fetcher: Arc<PagedCollectionFetcher>, page_size: u32) -> Self {
        Self {
            fetcher,
            page_size: page_size.max(1),
            state: FetchState::default(),
            view: V::default(),
            latest_token: 0,
            requested_page: 1,
            _resource: PhantomData,
        }
    }

    pub fn state(&self) -> &FetchState<R::Item, R::Meta> {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Page asked for most recently. Equals `current_page` once everything has settled.
    pub fn requested_page(&self) -> u32 {
        self.requested_page
    }

    /// Items of the current page after the view's filter and sort.
    pub fn visible_items(&self) -> Vec<&R::Item> {
        self.view.apply(&self.state.items)
    }

    /// Issue a new request for page `n` (clamped to `[1, total_pages]`).
    ///
    /// Any request issued earlier becomes stale.
    pub fn begin(&mut self, n: i64) -> PendingFetch {
        let page = n.clamp(1, self.state.total_pages as i64) as u32;
        self.latest_token += 1;
        self.requested_page = page;
        self.state.is_loading = true;
        tracing::debug!(
            "{}: issue token {} for page {}",
            R::NAME,
            self.latest_token,
            page
        );
        PendingFetch {
            token: self.latest_token,
            request: PageRequest {
                resource: R::NAME,
                page_number: page,
                page_size: self.page_size,
            },
        }
    }

    /// Issue a request for page `n` and return a `'static` future that performs it,
    /// suitable for `tokio::spawn`. Feed its output back through [`Self::complete`].
    pub fn spawnable(&mut self, n: i64) -> impl Future<Output = FetchOutcome<R>> + Send + 'static {
        let pending = self.begin(n);
        let fetcher = Arc::clone(&self.fetcher);
        async move { pending.run::<R>(fetcher).await }
    }

    pub fn complete(&mut self, outcome: FetchOutcome<R>) -> Completion {
        if outcome.token != self.latest_token {
            tracing::debug!(
                "{}: dropping stale response for page {} (token {}, latest {})",
                R::NAME,
                outcome.request.page_number,
                outcome.token,
                self.latest_token
            );
            return Completion::Stale;
        }
        self.state.is_loading = false;
        match outcome.result {
            Ok(page) => {
                let total = page.total_pages.max(1);
                let requested = outcome.request.page_number;
                if requested > total {
                    tracing::warn!(
                        "{}: page {} requested but server now reports {} pages",
                        R::NAME,
                        requested,
                        total
                    );
                }
                self.state.items = page.items;
                self.state.total_pages = total;
                self.state.current_page = requested.min(total);
                self.requested_page = self.state.current_page;
                self.state.meta = page.meta;
                self.state.last_error = None;
                Completion::Applied
            }
            Err(e) => {
                tracing::warn!("{}: fetch of page {} failed: {}", R::NAME, outcome.request.page_number, e);
                self.state.last_error = Some(e.clone());
                // nothing new is shown; step again from the page on screen
                self.requested_page = self.state.current_page;
                Completion::Failed(e)
            }
        }
    }

    pub async fn go_to_page(&mut self, n: i64) -> Completion {
        let fut = self.spawnable(n);
        let outcome = fut.await;
        self.complete(outcome)
    }

    /// Page `delta` steps away from the last requested one.
    pub fn step_target(&self, delta: i64) -> i64 {
        self.requested_page as i64 + delta
    }

    pub async fn next_page(&mut self) -> Completion {
        self.go_to_page(self.step_target(1)).await
    }

    pub async fn prev_page(&mut self) -> Completion {
        self.go_to_page(self.step_target(-1)).await
    }

    pub async fn refresh(&mut self) -> Completion {
        self.go_to_page(self.step_target(0)).await
    }

    /// Install a new view and start over from page 1.
    pub fn set_view(&mut self, view: V) -> PendingFetch {
        self.view = view;
        self.begin(1)
    }

    /// Swap the view without refetching; for sort-only changes over the loaded page.
    pub fn set_view_local(&mut self, view: V) {
        self.view = view;
    }

    /// Like [`Self::set_view`], returning the page-1 fetch as a `'static` future.
    pub fn spawnable_with_view(&mut self, view: V) -> impl Future<Output = FetchOutcome<R>> + Send + 'static {
        let pending = self.set_view(view);
        let fetcher = Arc::clone(&self.fetcher);
        async move { pending.run::<R>(fetcher).await }
    }

    pub async fn on_filter_change(&mut self, view: V) -> Completion {
        let pending = self.set_view(view);
        let outcome = pending.run::<R>(Arc::clone(&self.fetcher)).await;
        self.complete(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{AgentLogs, Assets};
    use crate::transport::{HttpResponse, Transport};
    use crate::view::{AgentFilter, AgentView, AssetView};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use url::Url;

    /// Serves `total` assets in pages; optionally fails every request.
    struct FakeAssets {
        total: usize,
        fail: Mutex<bool>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeAssets {
        fn new(total: usize) -> Arc<Self> {
            Arc::new(Self {
                total,
                fail: Mutex::new(false),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    fn query_u32(url: &str, key: &str) -> usize {
        let u = Url::parse(url).unwrap();
        u.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.parse().unwrap())
            .unwrap()
    }

    #[async_trait]
    impl Transport for FakeAssets {
        async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            if *self.fail.lock().unwrap() {
                return Ok(HttpResponse {
                    status: 503,
                    body: Vec::new(),
                });
            }
            let page = query_u32(url, "page");
            let limit = query_u32(url, "limit");
            let total_pages = self.total.div_ceil(limit).max(1);
            let start = (page - 1) * limit;
            let assets: Vec<serde_json::Value> = (start..(start + limit).min(self.total))
                .map(|i| serde_json::json!({"hostname": format!("host-{i:04}"), "collected_at": ""}))
                .collect();
            let body = serde_json::json!({"assets": assets, "total_pages": total_pages});
            Ok(HttpResponse {
                status: 200,
                body: serde_json::to_vec(&body).unwrap(),
            })
        }
    }

    fn nav(t: Arc<FakeAssets>, size: u32) -> PageNavigator<Assets, AssetView> {
        let f = PagedCollectionFetcher::new(Url::parse("http://localhost:8000").unwrap(), t);
        PageNavigator::new(Arc::new(f), size)
    }

    #[tokio::test]
    async fn initial_state_defaults() {
        let n = nav(FakeAssets::new(0), 50);
        let s = n.state();
        assert_eq!((s.current_page, s.total_pages), (1, 1));
        assert!(!s.is_loading && s.items.is_empty() && s.last_error.is_none());
    }

    #[tokio::test]
    async fn clamps_to_known_bounds() {
        let t = FakeAssets::new(250);
        let mut n = nav(t.clone(), 50);
        n.go_to_page(1).await;
        assert_eq!(n.state().total_pages, 5);

        assert_eq!(n.go_to_page(-3).await, Completion::Applied);
        assert_eq!(n.state().current_page, 1);

        assert_eq!(n.go_to_page(99).await, Completion::Applied);
        assert_eq!(n.state().current_page, 5);
        assert!(t.calls.lock().unwrap().last().unwrap().contains("page=5&"));
    }

    #[tokio::test]
    async fn go_to_page_is_idempotent_after_settling() {
        let mut n = nav(FakeAssets::new(120), 50);
        n.go_to_page(1).await;
        n.go_to_page(2).await;
        let first = n.state().clone();
        n.go_to_page(2).await;
        assert_eq!(n.state(), &first);
        assert_eq!(first.items.len(), 50);
    }

    #[tokio::test]
    async fn failure_keeps_items_and_pages() {
        let t = FakeAssets::new(120);
        let mut n = nav(t.clone(), 50);
        n.go_to_page(1).await;
        n.go_to_page(2).await;
        let before = n.state().clone();

        *t.fail.lock().unwrap() = true;
        let c = n.go_to_page(3).await;
        assert!(matches!(c, Completion::Failed(FetchError::Network(_))));

        let after = n.state();
        assert_eq!(after.items, before.items);
        assert_eq!(after.total_pages, before.total_pages);
        assert_eq!(after.current_page, before.current_page);
        assert!(!after.is_loading);
        assert!(after.last_error.is_some());

        let mut center = NotificationCenter::default();
        c.notify(&mut center);
        assert_eq!(
            center.visible().next().unwrap().message,
            "Failed to fetch asset data. (HTTP 503)"
        );

        // recovery clears the error
        *t.fail.lock().unwrap() = false;
        n.refresh().await;
        assert!(n.state().last_error.is_none());
    }

    #[tokio::test]
    async fn later_issued_request_wins_regardless_of_arrival() {
        let mut n = nav(FakeAssets::new(250), 50);
        n.go_to_page(1).await;

        let slow_page1 = n.spawnable(1);
        let fast_page2 = n.spawnable(2);
        assert!(n.state().is_loading);

        let out2 = fast_page2.await;
        assert_eq!(n.complete(out2), Completion::Applied);
        let out1 = slow_page1.await;
        assert_eq!(n.complete(out1), Completion::Stale);

        let s = n.state();
        assert_eq!(s.current_page, 2);
        assert_eq!(s.items[0].hostname, "host-0050");
        assert!(!s.is_loading);
    }

    #[tokio::test]
    async fn steps_from_requested_page_while_in_flight() {
        let mut n = nav(FakeAssets::new(250), 50);
        n.go_to_page(1).await;

        // two "next" presses before either reply lands
        let first = n.spawnable(n.step_target(1));
        assert_eq!(n.requested_page(), 2);
        let second = n.spawnable(n.step_target(1));
        assert_eq!(n.requested_page(), 3);
        assert_eq!(n.state().current_page, 1);

        assert_eq!(n.complete(second.await), Completion::Applied);
        assert_eq!(n.complete(first.await), Completion::Stale);
        assert_eq!(n.state().current_page, 3);
        assert_eq!(n.state().items[0].hostname, "host-0100");

        // stepping past the end stays clamped
        n.go_to_page(5).await;
        let again = n.spawnable(n.step_target(1));
        assert_eq!(n.requested_page(), 5);
        n.complete(again.await);
        assert_eq!(n.state().current_page, 5);
    }

    #[tokio::test]
    async fn failed_request_resets_step_origin() {
        let t = FakeAssets::new(250);
        let mut n = nav(t.clone(), 50);
        n.go_to_page(1).await;
        n.next_page().await;

        *t.fail.lock().unwrap() = true;
        assert!(matches!(n.next_page().await, Completion::Failed(_)));
        assert_eq!(n.state().current_page, 2);
        assert_eq!(n.requested_page(), 2);

        *t.fail.lock().unwrap() = false;
        n.next_page().await;
        assert_eq!(n.state().current_page, 3);
    }

    #[tokio::test]
    async fn stale_completion_does_not_clear_loading() {
        let mut n = nav(FakeAssets::new(250), 50);
        let a = n.spawnable(1);
        let b = n.spawnable(1);
        assert_eq!(n.complete(a.await), Completion::Stale);
        assert!(n.state().is_loading);
        assert_eq!(n.complete(b.await), Completion::Applied);
        assert!(!n.state().is_loading);
    }

    #[tokio::test]
    async fn shrinking_collection_clamps_current_page() {
        // navigator last saw 5 pages; the collection has since shrunk to 60 items
        let mut m = nav(FakeAssets::new(60), 50);
        m.state.total_pages = 5;
        m.go_to_page(5).await;
        assert_eq!(m.state().total_pages, 2);
        assert_eq!(m.state().current_page, 2);
    }

    #[tokio::test]
    async fn filter_change_resets_to_first_page() {
        struct OneAgentPage;
        #[async_trait]
        impl Transport for OneAgentPage {
            async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
                let page = query_u32(url, "page");
                let body = serde_json::json!({
                    "logs": [
                        {"agent_uuid": format!("p{page}-a"), "status": "Active", "last_heartbeat_str": ""},
                        {"agent_uuid": format!("p{page}-b"), "status": "Inactive", "last_heartbeat_str": ""}
                    ],
                    "total_pages": 3
                });
                Ok(HttpResponse {
                    status: 200,
                    body: serde_json::to_vec(&body).unwrap(),
                })
            }
        }
        let f = PagedCollectionFetcher::new(
            Url::parse("http://localhost:8000").unwrap(),
            Arc::new(OneAgentPage),
        );
        let mut n: PageNavigator<AgentLogs, AgentView> = PageNavigator::new(Arc::new(f), 50);
        n.go_to_page(1).await;
        n.next_page().await;
        n.next_page().await;
        assert_eq!(n.state().current_page, 3);

        let c = n
            .on_filter_change(AgentView {
                filter: AgentFilter::Active,
                ..Default::default()
            })
            .await;
        assert_eq!(c, Completion::Applied);
        assert_eq!(n.state().current_page, 1);
        let visible = n.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].agent_uuid, "p1-a");

        n.prev_page().await;
        assert_eq!(n.state().current_page, 1);
    }
}
