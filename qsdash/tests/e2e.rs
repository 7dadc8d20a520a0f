//! End-to-end: client against the demo API on an ephemeral port.
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use qsdash::app::App;
use qsdash::links::{ChecksumDisplay, FileDownloader, LinkLookup, OsKey};
use qsdash::navigator::{Completion, PageNavigator};
use qsdash::notify::ToastLevel;
use qsdash::view::{AgentFilter, AgentView, AssetView};
use qsdash::{AgentLogs, ApiConfig, Assets, FetchError};
use qsdash_demo_api::{router, DemoState};

async fn serve(state: DemoState) -> ApiConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });
    ApiConfig::new(&format!("http://{addr}"))
        .unwrap()
        .with_timeout(Duration::from_secs(5))
}

fn assets_nav(config: &ApiConfig) -> PageNavigator<Assets, AssetView> {
    let transport = config.transport().unwrap();
    PageNavigator::new(config.fetcher(transport), 50)
}

#[tokio::test]
async fn assets_page_two_has_fifty_of_five_pages() {
    let config = serve(DemoState::demo()).await;
    let mut nav = assets_nav(&config);

    assert_eq!(nav.go_to_page(1).await, Completion::Applied);
    assert_eq!(nav.go_to_page(2).await, Completion::Applied);

    let st = nav.state();
    assert_eq!(st.items.len(), 50);
    assert_eq!(st.total_pages, 5);
    assert_eq!(st.current_page, 2);
    assert_eq!(st.items[0].hostname, "asset-0050");
    assert!(st.last_error.is_none());

    // beyond the end clamps to the last page
    nav.go_to_page(99).await;
    assert_eq!(nav.state().current_page, 5);
    assert_eq!(nav.state().items.len(), 30);
}

#[tokio::test]
async fn monitoring_meta_and_filter_reset() {
    let config = serve(DemoState::demo()).await;
    let transport = config.transport().unwrap();
    let mut nav: PageNavigator<AgentLogs, AgentView> =
        PageNavigator::new(config.fetcher(transport), 50);

    nav.go_to_page(1).await;
    nav.next_page().await;
    assert_eq!(nav.state().current_page, 2);
    assert_eq!(nav.state().meta.total_agents, 137);
    assert_eq!(nav.state().total_pages, 3);

    let view = AgentView {
        filter: AgentFilter::Offline,
        ..Default::default()
    };
    assert_eq!(nav.on_filter_change(view).await, Completion::Applied);
    assert_eq!(nav.state().current_page, 1);
    assert!(nav
        .visible_items()
        .iter()
        .all(|a| a.status == qsdash::types::AgentStatus::Inactive));
}

#[tokio::test]
async fn missing_windows_installer_marks_only_that_card() {
    let config = serve(DemoState::demo()).await;
    let lookup = LinkLookup::new(config.base_url.clone(), config.transport().unwrap());

    let all = lookup.fetch_all().await;
    assert_eq!(all[&OsKey::Windows], ChecksumDisplay::Unavailable);
    assert_eq!(all[&OsKey::Windows].to_string(), "Unavailable");
    assert!(matches!(all[&OsKey::Linux], ChecksumDisplay::Available(_)));
    assert!(all[&OsKey::MacOs].to_string().ends_with("..."));

    let err = lookup.fetch_link_info(OsKey::Windows).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::NotFound("File not found. Make sure it's in the 'files' folder.".into())
    );
}

#[tokio::test]
async fn app_download_toasts_show_server_detail_and_saved_file() {
    let config = serve(DemoState::demo()).await;
    let transport = config.transport().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(FileDownloader::new(Arc::clone(&transport), dir.path()));
    let mut app = App::new(&config, transport, sink, Duration::from_secs(600));

    app.download(OsKey::Windows);
    assert!(app.next_event().await);
    let t = app.notifications.visible().next().unwrap();
    assert_eq!(t.level, ToastLevel::Error);
    assert_eq!(t.message, "File not found. Make sure it's in the 'files' folder.");
    // the card display is left alone
    assert_eq!(app.checksums()[&OsKey::Windows], ChecksumDisplay::Fetching);

    app.download(OsKey::MacOs);
    assert!(app.next_event().await);
    let t = app.notifications.visible().next().unwrap();
    assert_eq!(t.level, ToastLevel::Success, "{}", t.message);
    assert!(dir.path().join("mac_agent").exists());
}

#[tokio::test]
async fn app_start_loads_everything() {
    let config = serve(DemoState::demo()).await;
    let transport = config.transport().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(FileDownloader::new(Arc::clone(&transport), dir.path()));
    let mut app = App::new(&config, transport, sink, Duration::from_secs(600));

    app.start();
    // three checksum lookups + two first pages
    for _ in 0..5 {
        assert!(app.next_event().await);
    }
    assert_eq!(app.agents().state().total_pages, 3);
    assert_eq!(app.assets().state().total_pages, 5);
    assert!(!app.agents().state().is_loading);
    assert_eq!(app.checksums()[&OsKey::Windows], ChecksumDisplay::Unavailable);
    assert!(matches!(
        app.checksums()[&OsKey::Linux],
        ChecksumDisplay::Available(_)
    ));
}

#[tokio::test]
async fn late_page_one_reply_is_discarded() {
    let config = serve(DemoState::demo().with_page_delay(1, Duration::from_millis(400))).await;
    let mut nav = assets_nav(&config);
    nav.go_to_page(1).await;
    assert_eq!(nav.state().total_pages, 5);

    // issue page 1 (slow) then page 2 (fast)
    let slow = tokio::spawn(nav.spawnable(1));
    let fast = tokio::spawn(nav.spawnable(2));

    let fast = fast.await.unwrap();
    assert_eq!(nav.complete(fast), Completion::Applied);
    let slow = slow.await.unwrap();
    assert_eq!(nav.complete(slow), Completion::Stale);

    assert_eq!(nav.state().current_page, 2);
    assert_eq!(nav.state().items[0].hostname, "asset-0050");
    assert!(!nav.state().is_loading);
}

#[tokio::test]
async fn two_quick_page_presses_advance_two_pages() {
    let config = serve(DemoState::demo().with_page_delay(2, Duration::from_millis(300))).await;
    let transport = config.transport().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(FileDownloader::new(Arc::clone(&transport), dir.path()));
    let mut app = App::new(&config, transport, sink, Duration::from_secs(600));

    app.start();
    for _ in 0..5 {
        assert!(app.next_event().await);
    }
    let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
    app.handle_key(key(KeyCode::Char('3')));
    app.handle_key(key(KeyCode::Right));
    app.handle_key(key(KeyCode::Right));
    assert_eq!(app.assets().requested_page(), 3);

    // page 3 applies, the delayed page 2 arrives stale
    assert!(app.next_event().await);
    assert!(app.next_event().await);
    let st = app.assets().state();
    assert_eq!(st.current_page, 3);
    assert_eq!(st.items[0].hostname, "asset-0100");
    assert!(!st.is_loading);
}
