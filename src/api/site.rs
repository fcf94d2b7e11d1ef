//! Site info API endpoint
//!
//! - GET /api/v1/site - service name, version, uptime and request stats

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::middleware::AppState;

/// Service metadata and runtime statistics
#[derive(Debug, Serialize)]
pub struct SiteResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub avg_response_time_us: f64,
}

/// Build the site router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(site_info))
}

/// GET /api/v1/site
async fn site_info(State(state): State<AppState>) -> Json<SiteResponse> {
    Json(SiteResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.request_stats.uptime_seconds(),
        total_requests: state.request_stats.total_requests(),
        avg_response_time_us: state.request_stats.avg_response_time_us(),
    })
}
