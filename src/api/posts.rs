//! Blog post API endpoints
//!
//! Public surface:
//! - GET /api/v1/posts - published posts, paginated
//! - GET /api/v1/posts/{slug} - one published post with rendered HTML
//!
//! Admin surface (session + admin role):
//! - GET /api/v1/admin/posts - all posts including drafts
//! - POST /api/v1/admin/posts - create a post
//! - GET/PUT/DELETE /api/v1/admin/posts/{slug}
//! - GET /api/v1/admin/posts/{slug}/export - markdown document
//! - POST /api/v1/admin/posts/import - create from a markdown document

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{PaginatedPostsResponse, PostResponse};
use crate::models::{CreatePostInput, ListParams, UpdatePostInput};
use crate::services::frontmatter;
use crate::services::post::PostServiceError;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl Pagination {
    fn into_params(self) -> ListParams {
        let defaults = ListParams::default();
        ListParams::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}

/// Build the public posts router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published))
        .route("/{slug}", get(get_published))
}

/// Build the admin posts router (auth + admin middleware applied by caller)
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create))
        .route("/import", post(import))
        .route("/{slug}", get(get_any).put(update).delete(delete))
        .route("/{slug}/export", get(export))
}

fn map_service_error(err: PostServiceError) -> ApiError {
    match err {
        PostServiceError::NotFound(slug) => ApiError::not_found(format!("Post not found: {}", slug)),
        PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        PostServiceError::DuplicateSlug(slug) => {
            ApiError::conflict(format!("Post slug already exists: {}", slug))
        }
        PostServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/posts - list published posts
async fn list_published(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedPostsResponse>, ApiError> {
    let result = state
        .post_service
        .list_published(&pagination.into_params())
        .await
        .map_err(map_service_error)?;

    Ok(Json(result.into()))
}

/// GET /api/v1/posts/{slug} - get a published post
async fn get_published(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .post_service
        .get_published_by_slug(&slug)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::not_found(format!("Post not found: {}", slug)))?;

    let html = state.post_service.render_markdown(&post.content);
    Ok(Json(PostResponse::from_post(post, html)))
}

/// GET /api/v1/admin/posts - list all posts, drafts included
async fn list_all(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedPostsResponse>, ApiError> {
    let result = state
        .post_service
        .list(&pagination.into_params())
        .await
        .map_err(map_service_error)?;

    Ok(Json(result.into()))
}

/// GET /api/v1/admin/posts/{slug} - get a post regardless of status
async fn get_any(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .post_service
        .get_by_slug(&slug)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::not_found(format!("Post not found: {}", slug)))?;

    let html = state.post_service.render_markdown(&post.content);
    Ok(Json(PostResponse::from_post(post, html)))
}

/// POST /api/v1/admin/posts - create a post
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .post_service
        .create(input)
        .await
        .map_err(map_service_error)?;

    let html = state.post_service.render_markdown(&post.content);
    Ok((StatusCode::CREATED, Json(PostResponse::from_post(post, html))))
}

/// PUT /api/v1/admin/posts/{slug} - update a post
async fn update(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .post_service
        .update(&slug, input)
        .await
        .map_err(map_service_error)?;

    let html = state.post_service.render_markdown(&post.content);
    Ok(Json(PostResponse::from_post(post, html)))
}

/// DELETE /api/v1/admin/posts/{slug} - delete a post
async fn delete(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .post_service
        .delete(&slug)
        .await
        .map_err(map_service_error)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Post not found: {}", slug)))
    }
}

/// GET /api/v1/admin/posts/{slug}/export - export as a markdown document
async fn export(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .post_service
        .get_by_slug(&slug)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::not_found(format!("Post not found: {}", slug)))?;

    let document = frontmatter::render_document(&post)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        document,
    ))
}

/// POST /api/v1/admin/posts/import - create a post from a markdown document
///
/// The body is the raw document; metadata comes from its frontmatter
/// block and the remainder becomes the post content.
async fn import(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let (fm, content) = frontmatter::parse_document(&body)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;

    let mut input: CreatePostInput = fm.into();
    input.content = content;

    let post = state
        .post_service
        .create(input)
        .await
        .map_err(map_service_error)?;

    let html = state.post_service.render_markdown(&post.content);
    Ok((StatusCode::CREATED, Json(PostResponse::from_post(post, html))))
}
