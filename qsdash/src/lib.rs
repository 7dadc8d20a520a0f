//! qsdash: terminal client for the QStellar security dashboard API.
//!
//! The library holds the paged fetch layer ([`fetcher`], [`navigator`]), the per-OS
//! download link lookup ([`links`]), idle detection, notifications and the ratatui
//! front-end. The `qsdash` binary wires them to the command line.

pub mod app;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod history;
pub mod idle;
pub mod links;
pub mod logging;
pub mod navigator;
pub mod notify;
pub mod profiles;
pub mod transport;
pub mod types;
pub mod ui;
pub mod view;

pub use config::ApiConfig;
pub use error::{ConfigError, FetchError};
pub use fetcher::{AgentLogs, Assets, PageResult, PagedCollectionFetcher, Resource};
pub use links::{ChecksumDisplay, DownloadSink, FileDownloader, LinkLookup, OsKey};
pub use navigator::{Completion, FetchState, PageNavigator};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
