//! App state and main loop: input handling, dispatching fetches, applying results, drawing.

use std::{
    collections::BTreeMap,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::fetcher::{AgentLogs, Assets};
use crate::history::StatusHistory;
use crate::idle::{IdleContext, IdleEvent, IdleTimer};
use crate::links::{ChecksumDisplay, DownloadReceipt, DownloadSink, LinkLookup, OsKey};
use crate::navigator::{Completion, FetchOutcome, PageNavigator};
use crate::notify::{NotificationCenter, ToastLevel};
use crate::transport::Transport;
use crate::types::AgentStatus;
use crate::ui::{
    agents::draw_agents,
    assets::draw_assets,
    downloads::draw_downloads,
    header::draw_header,
    overlay::{draw_idle_panel, draw_toasts},
    table::{scroll_clamp, scroll_handle_key},
};
use crate::view::{AgentView, AssetView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Downloads,
    Monitoring,
    Assets,
}

impl Tab {
    pub fn index(self) -> usize {
        match self {
            Tab::Downloads => 0,
            Tab::Monitoring => 1,
            Tab::Assets => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            Tab::Downloads => Tab::Monitoring,
            Tab::Monitoring => Tab::Assets,
            Tab::Assets => Tab::Downloads,
        }
    }

    fn prev(self) -> Self {
        self.next().next()
    }

    fn idle_context(self) -> IdleContext {
        match self {
            Tab::Downloads => IdleContext::Dashboard,
            Tab::Monitoring => IdleContext::Agents,
            Tab::Assets => IdleContext::Assets,
        }
    }
}

/// Results of background work, fed back into the loop.
pub enum AppEvent {
    Agents(FetchOutcome<AgentLogs>),
    Assets(FetchOutcome<Assets>),
    /// A checksum lookup from refresh round `generation`.
    Checksum {
        generation: u64,
        key: OsKey,
        display: ChecksumDisplay,
    },
    Download {
        toast: u64,
        key: OsKey,
        result: Result<DownloadReceipt, FetchError>,
    },
}

pub struct App {
    api_label: String,
    tab: Tab,

    agents: PageNavigator<AgentLogs, AgentView>,
    assets: PageNavigator<Assets, AssetView>,
    status_hist: StatusHistory,

    links: LinkLookup,
    sink: Arc<dyn DownloadSink>,
    checksums: BTreeMap<OsKey, ChecksumDisplay>,
    checksum_generation: u64,
    selected_os: usize,

    pub notifications: NotificationCenter,
    idle_timeout: Duration,
    idle: Option<IdleContext>,

    agents_scroll: usize,
    assets_scroll: usize,
    last_viewport_rows: usize,
    /// Some while the asset search box is being edited.
    search_input: Option<String>,

    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,

    should_quit: bool,
}

impl App {
    pub fn new(
        config: &ApiConfig,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn DownloadSink>,
        idle_timeout: Duration,
    ) -> Self {
        let fetcher = config.fetcher(Arc::clone(&transport));
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api_label: config.base_url.to_string(),
            tab: Tab::default(),
            agents: PageNavigator::new(Arc::clone(&fetcher), config.page_size),
            assets: PageNavigator::new(fetcher, config.page_size),
            status_hist: StatusHistory::new(120),
            links: config.link_lookup(transport),
            sink,
            checksums: OsKey::ALL
                .iter()
                .map(|k| (*k, ChecksumDisplay::Fetching))
                .collect(),
            checksum_generation: 0,
            selected_os: 0,
            notifications: NotificationCenter::default(),
            idle_timeout,
            idle: None,
            agents_scroll: 0,
            assets_scroll: 0,
            last_viewport_rows: 10,
            search_input: None,
            tx,
            rx,
            should_quit: false,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn agents(&self) -> &PageNavigator<AgentLogs, AgentView> {
        &self.agents
    }

    pub fn assets(&self) -> &PageNavigator<Assets, AssetView> {
        &self.assets
    }

    pub fn checksums(&self) -> &BTreeMap<OsKey, ChecksumDisplay> {
        &self.checksums
    }

    pub fn is_idle(&self) -> bool {
        self.idle.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run(&mut self) -> Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    /// Kick off everything the first screen needs.
    pub fn start(&mut self) {
        self.refresh_checksums();
        self.spawn_agents(1);
        self.spawn_assets(1);
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<()> {
        let (idle_timer, mut idle_rx) = IdleTimer::spawn(self.idle_timeout);
        self.start();

        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                match event::read()? {
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        idle_timer.touch();
                        self.handle_key(k);
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
            if self.should_quit {
                break;
            }

            while let Ok(ev) = idle_rx.try_recv() {
                self.handle_idle(ev);
            }
            self.drain_events();
            self.notifications.prune(Instant::now());

            terminal.draw(|f| self.draw(f))?;

            sleep(Duration::from_millis(50)).await;
        }

        tracing::info!("quit");
        Ok(())
    }

    /// Apply every background result that has arrived so far.
    pub fn drain_events(&mut self) {
        while let Ok(ev) = self.rx.try_recv() {
            self.handle_event(ev);
        }
    }

    /// Wait for the next background result and apply it.
    pub async fn next_event(&mut self) -> bool {
        match self.rx.recv().await {
            Some(ev) => {
                self.handle_event(ev);
                true
            }
            None => false,
        }
    }

    pub fn handle_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Agents(outcome) => {
                let c = self.agents.complete(outcome);
                if c == Completion::Applied {
                    let items = &self.agents.state().items;
                    let active = items.iter().filter(|a| a.status == AgentStatus::Active).count();
                    self.status_hist.push(active, items.len() - active);
                }
                c.notify(&mut self.notifications);
            }
            AppEvent::Assets(outcome) => {
                self.assets.complete(outcome).notify(&mut self.notifications);
            }
            AppEvent::Checksum {
                generation,
                key,
                display,
            } => {
                if generation != self.checksum_generation {
                    tracing::debug!(
                        "dropping checksum for {} from refresh {} (latest {})",
                        key,
                        generation,
                        self.checksum_generation
                    );
                    return;
                }
                self.checksums.insert(key, display);
            }
            AppEvent::Download { toast, key, result } => match result {
                Ok(receipt) => self.notifications.update(
                    toast,
                    ToastLevel::Success,
                    format!("{} agent saved to {}", key.api_name(), receipt.path.display()),
                ),
                Err(e) => self.notifications.update(toast, ToastLevel::Error, e.to_string()),
            },
        }
    }

    pub fn handle_idle(&mut self, ev: IdleEvent) {
        self.idle = match ev {
            IdleEvent::Idle => Some(self.tab.idle_context()),
            IdleEvent::Active => None,
        };
    }

    pub fn handle_key(&mut self, k: KeyEvent) {
        // first key after going idle only dismisses the panel
        if self.idle.take().is_some() {
            return;
        }
        if let Some(buf) = self.search_input.as_mut() {
            match k.code {
                KeyCode::Enter => {
                    let q = buf.trim().to_string();
                    self.search_input = None;
                    let view = AssetView {
                        search: (!q.is_empty()).then_some(q),
                        ..self.assets.view().clone()
                    };
                    self.spawn_assets_view(view);
                }
                KeyCode::Esc => self.search_input = None,
                KeyCode::Backspace => {
                    buf.pop();
                }
                KeyCode::Char(c) => buf.push(c),
                _ => {}
            }
            return;
        }

        match k.code {
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::BackTab => self.tab = self.tab.prev(),
            KeyCode::Char('1') => self.tab = Tab::Downloads,
            KeyCode::Char('2') => self.tab = Tab::Monitoring,
            KeyCode::Char('3') => self.tab = Tab::Assets,
            _ => match self.tab {
                Tab::Downloads => self.downloads_key(k),
                Tab::Monitoring => self.agents_key(k),
                Tab::Assets => self.assets_key(k),
            },
        }
    }

    fn downloads_key(&mut self, k: KeyEvent) {
        let n = OsKey::ALL.len();
        match k.code {
            KeyCode::Left | KeyCode::Char('h') => self.selected_os = (self.selected_os + n - 1) % n,
            KeyCode::Right | KeyCode::Char('l') => self.selected_os = (self.selected_os + 1) % n,
            KeyCode::Enter | KeyCode::Char('d') => self.download(OsKey::ALL[self.selected_os]),
            KeyCode::Char('r') => self.refresh_checksums(),
            _ => {}
        }
    }

    fn agents_key(&mut self, k: KeyEvent) {
        let total = self.agents.state().total_pages as i64;
        match k.code {
            KeyCode::Left | KeyCode::Char('h') => self.spawn_agents(self.agents.step_target(-1)),
            KeyCode::Right | KeyCode::Char('l') => self.spawn_agents(self.agents.step_target(1)),
            KeyCode::Char('g') => self.spawn_agents(1),
            KeyCode::Char('G') => self.spawn_agents(total),
            KeyCode::Char('r') => self.spawn_agents(self.agents.step_target(0)),
            KeyCode::Char('f') => {
                let mut view = *self.agents.view();
                view.filter = view.filter.next();
                self.spawn_agents_view(view);
            }
            KeyCode::Char('s') => {
                let mut view = *self.agents.view();
                view.sort = view.sort.next();
                self.agents.set_view_local(view);
            }
            KeyCode::Char('o') => {
                let mut view = *self.agents.view();
                view.order = view.order.toggle();
                self.agents.set_view_local(view);
            }
            _ => {
                scroll_handle_key(&mut self.agents_scroll, k, self.last_viewport_rows);
                scroll_clamp(
                    &mut self.agents_scroll,
                    self.agents.visible_items().len(),
                    self.last_viewport_rows,
                );
            }
        }
    }

    fn assets_key(&mut self, k: KeyEvent) {
        let total = self.assets.state().total_pages as i64;
        match k.code {
            KeyCode::Left | KeyCode::Char('h') => self.spawn_assets(self.assets.step_target(-1)),
            KeyCode::Right | KeyCode::Char('l') => self.spawn_assets(self.assets.step_target(1)),
            KeyCode::Char('g') => self.spawn_assets(1),
            KeyCode::Char('G') => self.spawn_assets(total),
            KeyCode::Char('r') => self.spawn_assets(self.assets.step_target(0)),
            KeyCode::Char('/') => {
                self.search_input = Some(self.assets.view().search.clone().unwrap_or_default())
            }
            KeyCode::Char('s') => {
                let mut view = self.assets.view().clone();
                view.sort = view.sort.next();
                self.assets.set_view_local(view);
            }
            KeyCode::Char('o') => {
                let mut view = self.assets.view().clone();
                view.order = view.order.toggle();
                self.assets.set_view_local(view);
            }
            _ => {
                scroll_handle_key(&mut self.assets_scroll, k, self.last_viewport_rows);
                scroll_clamp(
                    &mut self.assets_scroll,
                    self.assets.visible_items().len(),
                    self.last_viewport_rows,
                );
            }
        }
    }

    fn spawn_agents(&mut self, n: i64) {
        self.agents_scroll = 0;
        let fut = self.agents.spawnable(n);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Agents(fut.await));
        });
    }

    fn spawn_agents_view(&mut self, view: AgentView) {
        self.agents_scroll = 0;
        let fut = self.agents.spawnable_with_view(view);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Agents(fut.await));
        });
    }

    fn spawn_assets(&mut self, n: i64) {
        self.assets_scroll = 0;
        let fut = self.assets.spawnable(n);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Assets(fut.await));
        });
    }

    fn spawn_assets_view(&mut self, view: AssetView) {
        self.assets_scroll = 0;
        let fut = self.assets.spawnable_with_view(view);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Assets(fut.await));
        });
    }

    /// One task per OS so each card fills in as its own answer arrives.
    /// Answers from an earlier round are dropped.
    fn refresh_checksums(&mut self) {
        self.checksum_generation += 1;
        let generation = self.checksum_generation;
        for key in OsKey::ALL {
            self.checksums.insert(key, ChecksumDisplay::Fetching);
            let fut = self.links.checksum_task(key);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let (key, display) = fut.await;
                let _ = tx.send(AppEvent::Checksum {
                    generation,
                    key,
                    display,
                });
            });
        }
    }

    pub fn download(&mut self, key: OsKey) {
        let toast = self
            .notifications
            .loading(format!("Requesting {} agent...", key.api_name()));
        let links = self.links.clone();
        let sink = Arc::clone(&self.sink);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = links.trigger_download(key, sink.as_ref()).await;
            let _ = tx.send(AppEvent::Download { toast, key, result });
        });
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(8)])
            .split(area);

        draw_header(f, rows[0], &self.api_label, self.tab.index());

        // table borders (2) + header row (1) + pager (1)
        self.last_viewport_rows = rows[1].height.saturating_sub(4).max(1) as usize;
        match self.tab {
            Tab::Downloads => draw_downloads(f, rows[1], &self.checksums, self.selected_os),
            Tab::Monitoring => draw_agents(
                f,
                rows[1],
                &self.agents,
                &self.status_hist,
                self.agents_scroll,
            ),
            Tab::Assets => draw_assets(
                f,
                rows[1],
                &self.assets,
                self.search_input.as_deref(),
                self.assets_scroll,
            ),
        }

        if let Some(ctx) = self.idle {
            draw_idle_panel(f, rows[1], ctx);
        }
        draw_toasts(f, area, &self.notifications);
    }
}
