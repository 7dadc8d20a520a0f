//! HTTP handlers for the three list/link endpoints and file downloads.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::state::{file_for_os, sha256_hex, SharedState};
use crate::types::{AssetPage, Detail, LinkResponse, MonitoringPage, PageQuery, TokenQuery};

pub const MAX_LIMIT: i64 = 200;
pub const DEFAULT_LIMIT: i64 = 50;

fn detail(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(Detail { detail: msg.into() })).into_response()
}

/// Validated `(page, limit)`, or the 422 to send back.
pub fn page_params(q: PageQuery) -> Result<(u32, u32), Response> {
    let page = q.page.unwrap_or(1);
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT);
    if page < 1 {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "page must be >= 1"));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("limit must be between 1 and {MAX_LIMIT}"),
        ));
    }
    let page = u32::try_from(page)
        .map_err(|_| detail(StatusCode::UNPROCESSABLE_ENTITY, "page out of range"))?;
    Ok((page, limit as u32))
}

/// Slice out one page. `total_pages` is at least 1 even for an empty collection.
pub fn paginate<T: Clone>(rows: &[T], page: u32, limit: u32) -> (Vec<T>, u32) {
    let limit = limit.max(1) as usize;
    let total_pages = rows.len().div_ceil(limit).max(1) as u32;
    let start = (page.saturating_sub(1) as usize).saturating_mul(limit);
    let items = rows.iter().skip(start).take(limit).cloned().collect();
    (items, total_pages)
}

async fn maybe_delay(state: &SharedState, page: u32) {
    if let Some(d) = state.page_delays.get(&page) {
        tokio::time::sleep(*d).await;
    }
}

pub async fn monitoring_data(
    State(state): State<SharedState>,
    Query(q): Query<PageQuery>,
) -> Response {
    let (page, limit) = match page_params(q) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    maybe_delay(&state, page).await;

    let (logs, total_pages) = paginate(&state.agents, page, limit);
    let unique_ips = state
        .agents
        .iter()
        .map(|a| a.ip_address.as_str())
        .collect::<HashSet<_>>()
        .len();
    let latest = state
        .agents
        .iter()
        .map(|a| a.last_heartbeat_str.as_str())
        .max()
        .unwrap_or("N/A")
        .to_string();
    tracing::debug!("monitoring page {page} limit {limit} -> {} rows", logs.len());

    Json(MonitoringPage {
        logs,
        total_downloads: state.agents.len(),
        unique_ips,
        latest_download_time: latest,
        current_page: page,
        total_pages,
    })
    .into_response()
}

pub async fn assets(State(state): State<SharedState>, Query(q): Query<PageQuery>) -> Response {
    let (page, limit) = match page_params(q) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    maybe_delay(&state, page).await;

    let (assets, total_pages) = paginate(&state.assets, page, limit);
    tracing::debug!("assets page {page} limit {limit} -> {} rows", assets.len());
    Json(AssetPage {
        assets,
        current_page: page,
        total_pages,
    })
    .into_response()
}

pub async fn get_link(
    State(state): State<SharedState>,
    Path(os): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(file) = file_for_os(&os) else {
        return detail(StatusCode::NOT_FOUND, "OS not found");
    };
    let Some(bytes) = state.files.get(file) else {
        tracing::warn!("get_link/{os}: {file} not present");
        return detail(
            StatusCode::NOT_FOUND,
            "File not found. Make sure it's in the 'files' folder.",
        );
    };

    let token = state.issue_token(file);
    let path = format!("/downloads/{file}?token={token}");
    let url = match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{host}{path}"),
        None => path,
    };
    Json(LinkResponse {
        url,
        sha256: sha256_hex(bytes),
    })
    .into_response()
}

pub async fn download_file(
    State(state): State<SharedState>,
    Path(file): Path<String>,
    Query(q): Query<TokenQuery>,
) -> Response {
    let valid = q
        .token
        .as_deref()
        .is_some_and(|t| state.redeem_token(t, &file));
    if !valid {
        return detail(StatusCode::FORBIDDEN, "Invalid or missing token");
    }
    let Some(bytes) = state.files.get(&file) else {
        return detail(StatusCode::NOT_FOUND, "File not found");
    };
    tracing::info!("download {file} ({} bytes)", bytes.len());
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file}\""),
            ),
        ],
        bytes.clone(),
    )
        .into_response()
}
