//! API middleware
//!
//! Contains middleware for:
//! - Authentication (session token validation)
//! - Authorization (admin gating)
//! - Request statistics

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::models::User;
use crate::services::post::PostService;
use crate::services::project::ProjectService;
use crate::services::summary::SummaryService;
use crate::services::user::UserService;
use crate::services::LoginRateLimiter;

/// Lightweight request statistics using atomic operations (no locks)
pub struct RequestStats {
    total_requests: AtomicU64,
    /// Total response time in microseconds, for computing the average
    total_response_time_us: AtomicU64,
    start_time: Instant,
}

impl RequestStats {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request with its response time
    pub fn record(&self, duration_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us
            .fetch_add(duration_us, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn avg_response_time_us(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let total_time = self.total_response_time_us.load(Ordering::Relaxed);
        total_time as f64 / total as f64
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    pub user_service: Arc<UserService>,
    pub project_service: Arc<ProjectService>,
    pub summary_service: Arc<SummaryService>,
    pub rate_limiter: Arc<LoginRateLimiter>,
    pub request_stats: Arc<RequestStats>,
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new("RATE_LIMIT", message)
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "RATE_LIMIT" => StatusCode::TOO_MANY_REQUESTS,
            "UPSTREAM_ERROR" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract session token from request (Bearer header wins over cookie)
pub fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await
        .map_err(|e| ApiError::internal_error(format!("Session validation failed: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Admin authorization middleware; must run after `require_auth`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

/// Request statistics middleware
pub async fn request_stats_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;

    let duration_us = start.elapsed().as_micros() as u64;
    state.request_stats.record(duration_us);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};

    #[test]
    fn test_extract_session_token_from_bearer() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer test-token-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_session_token(&request),
            Some("test-token-123".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let request = Request::builder()
            .uri("/test")
            .header(header::COOKIE, "theme=dark; session=test-token-456")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_session_token(&request),
            Some("test-token-456".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_bearer_priority() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer bearer-token")
            .header(header::COOKIE, "session=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_session_token(&request),
            Some("bearer-token".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_none() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_session_token(&request).is_none());

        let basic = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Basic invalid")
            .body(Body::empty())
            .unwrap();
        assert!(extract_session_token(&basic).is_none());
    }

    #[test]
    fn test_api_error_codes() {
        assert_eq!(ApiError::unauthorized("x").error.code, "UNAUTHORIZED");
        assert_eq!(ApiError::rate_limited("x").error.code, "RATE_LIMIT");
        assert_eq!(ApiError::conflict("x").error.code, "CONFLICT");
    }

    #[test]
    fn test_api_error_with_details() {
        let details = serde_json::json!({"field": "title"});
        let error = ApiError::with_details("VALIDATION_ERROR", "Invalid", details.clone());
        assert_eq!(error.error.details, Some(details));
    }

    #[test]
    fn test_request_stats_average() {
        let stats = RequestStats::new();
        assert_eq!(stats.avg_response_time_us(), 0.0);

        stats.record(100);
        stats.record(300);
        assert_eq!(stats.total_requests(), 2);
        assert_eq!(stats.avg_response_time_us(), 200.0);
    }
}
