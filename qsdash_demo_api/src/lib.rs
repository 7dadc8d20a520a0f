//! In-memory stand-in for the QStellar dashboard API.
//!
//! Serves the same JSON shapes the real backend does for
//! `/server_dashboard/data`, `/api/assets`, `/get_link/{os}` and `/downloads/{file}`.

pub mod routes;
pub mod seed;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{routing::get, Router};

pub use state::DemoState;

pub fn router(state: DemoState) -> Router {
    Router::new()
        .route("/server_dashboard/data", get(routes::monitoring_data))
        .route("/api/assets", get(routes::assets))
        .route("/get_link/:os", get(routes::get_link))
        .route("/downloads/:file", get(routes::download_file))
        .with_state(Arc::new(state))
}
