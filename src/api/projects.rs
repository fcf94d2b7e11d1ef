//! Project API endpoints
//!
//! Public surface:
//! - GET /api/v1/projects - repository listing
//! - GET /api/v1/projects/featured - featured repositories
//! - GET /api/v1/projects/{name} - aggregated project view
//! - GET /api/v1/projects/{name}/summary - AI summary, cached 24h
//!
//! Admin surface:
//! - DELETE /api/v1/admin/summaries/{name} - drop one cached summary
//! - DELETE /api/v1/admin/summaries - drop all cached summaries
//! - GET /api/v1/admin/summaries/stats - summary cache occupancy
//! - POST /api/v1/admin/projects/refresh - drop cached project views

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::ai::ProjectSummaryInput;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{ProjectData, Repo, SummaryRecord, SummaryStats};
use crate::services::project::ProjectServiceError;

/// Query parameters for the project listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub exclude_forks: Option<bool>,
}

/// Query parameters for the summary endpoint
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub refresh: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: usize,
}

/// Build the public projects router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/featured", get(featured))
        .route("/{name}", get(get_project))
        .route("/{name}/summary", get(get_summary))
}

/// Build the admin summary-cache router
pub fn admin_summaries_router() -> Router<AppState> {
    Router::new()
        .route("/", delete(clear_all_summaries))
        .route("/stats", get(summary_stats))
        .route("/{name}", delete(clear_summary))
}

/// Build the admin projects router
pub fn admin_projects_router() -> Router<AppState> {
    Router::new().route("/refresh", post(refresh_projects))
}

fn map_service_error(err: ProjectServiceError) -> ApiError {
    match err {
        ProjectServiceError::NotFound(name) => {
            ApiError::not_found(format!("Project not found: {}", name))
        }
        ProjectServiceError::Upstream(e) => ApiError::upstream_error(e.to_string()),
    }
}

/// GET /api/v1/projects - list repositories (forks excluded by default)
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Repo>>, ApiError> {
    let repos = state
        .project_service
        .list_projects(query.exclude_forks.unwrap_or(true))
        .await
        .map_err(map_service_error)?;

    Ok(Json(repos))
}

/// GET /api/v1/projects/featured - featured repositories
async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Repo>>, ApiError> {
    let repos = state
        .project_service
        .featured_projects()
        .await
        .map_err(map_service_error)?;

    Ok(Json(repos))
}

/// GET /api/v1/projects/{name} - aggregated project view
async fn get_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ProjectData>, ApiError> {
    let data = state
        .project_service
        .fetch_project_data(&name)
        .await
        .map_err(map_service_error)?;

    Ok(Json(data))
}

/// GET /api/v1/projects/{name}/summary - AI summary for a project
///
/// Serves the cached summary when one is valid; `?refresh=true` discards
/// it and generates anew.
async fn get_summary(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryRecord>, ApiError> {
    if query.refresh.unwrap_or(false) {
        state.summary_service.clear(&name).await;
    }

    let data = state
        .project_service
        .fetch_project_data(&name)
        .await
        .map_err(map_service_error)?;

    let input = ProjectSummaryInput::from_repo(&data.repo, data.readme.as_deref());
    let record = state
        .summary_service
        .generate(&name, &input)
        .await
        .map_err(|e| ApiError::upstream_error(e.to_string()))?;

    Ok(Json(record))
}

/// DELETE /api/v1/admin/summaries/{name} - drop one cached summary
async fn clear_summary(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClearedResponse>, ApiError> {
    let existed = state.summary_service.clear(&name).await;
    Ok(Json(ClearedResponse {
        cleared: usize::from(existed),
    }))
}

/// DELETE /api/v1/admin/summaries - drop all cached summaries
async fn clear_all_summaries(
    State(state): State<AppState>,
) -> Result<Json<ClearedResponse>, ApiError> {
    let cleared = state.summary_service.clear_all().await;
    Ok(Json(ClearedResponse { cleared }))
}

/// GET /api/v1/admin/summaries/stats - summary cache occupancy
async fn summary_stats(State(state): State<AppState>) -> Json<SummaryStats> {
    Json(state.summary_service.stats().await)
}

/// POST /api/v1/admin/projects/refresh - drop cached project views
async fn refresh_projects(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.project_service.invalidate().await;
    Json(serde_json::json!({ "refreshed": true }))
}
