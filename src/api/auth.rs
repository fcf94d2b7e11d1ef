//! Authentication API endpoints
//!
//! - POST /api/v1/auth/register - owner registration (first user only)
//! - POST /api/v1/auth/login - login, rate limited
//! - POST /api/v1/auth/logout - invalidate the current session
//! - GET /api/v1/auth/me - current user
//! - GET /api/v1/auth/has-owner - whether setup has happened

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::User;
use crate::services::user::UserServiceError;

/// Request body for owner registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Response for user info
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HasOwnerResponse {
    pub has_owner: bool,
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/has-owner", get(has_owner))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token, max_age_secs
    )
}

/// GET /api/v1/auth/has-owner - whether the owner account exists
async fn has_owner(State(state): State<AppState>) -> Result<Json<HasOwnerResponse>, ApiError> {
    let open = state
        .user_service
        .registration_open()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(HasOwnerResponse { has_owner: !open }))
}

/// POST /api/v1/auth/register - create the owner account
///
/// Closed once a user exists; the created account is logged in
/// immediately and receives a session cookie.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_service
        .register(&body.username, &body.password, &body.display_name)
        .await
        .map_err(|e| match e {
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::RegistrationClosed => ApiError::forbidden(e.to_string()),
            _ => ApiError::internal_error(e.to_string()),
        })?;

    let (user, session) = state
        .user_service
        .login(&user.username, &body.password)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let max_age = state.user_service.session_days() * 24 * 60 * 60;
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&session_cookie(&session.id, max_age))
            .map_err(|_| ApiError::internal_error("Invalid session token"))?,
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/login - verify credentials and mint a session
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // IP rate limit: 10 requests per minute
    if let Some(ip) = extract_ip_address(&headers).and_then(|s| s.parse().ok()) {
        if state.rate_limiter.is_ip_limited(ip).await {
            return Err(ApiError::with_details(
                "RATE_LIMIT",
                "Too many login requests, try again later",
                serde_json::json!({"retry_after": 60}),
            ));
        }
        state.rate_limiter.record_ip_request(ip).await;
    }

    // Username rate limit: 5 failed attempts per 15 minutes
    if state.rate_limiter.is_username_limited(&body.username).await {
        return Err(ApiError::with_details(
            "RATE_LIMIT",
            "Too many failed attempts, try again later",
            serde_json::json!({"retry_after": 900}),
        ));
    }

    let (user, session) = match state
        .user_service
        .login(&body.username, &body.password)
        .await
    {
        Ok(authenticated) => authenticated,
        Err(UserServiceError::AuthenticationError) => {
            // Recorded before responding so the attempt always counts
            state
                .rate_limiter
                .record_failed_attempt(&body.username)
                .await;
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
        Err(_) => return Err(ApiError::internal_error("Login failed")),
    };

    state
        .rate_limiter
        .clear_username_attempts(&body.username)
        .await;

    let max_age = state.user_service.session_days() * 24 * 60 * 60;
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&session_cookie(&session.id, max_age))
            .map_err(|_| ApiError::internal_error("Invalid session token"))?,
    );

    Ok((
        response_headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/logout - invalidate the current session
async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| {
                    s.split(';')
                        .map(str::trim)
                        .find_map(|c| c.strip_prefix("session="))
                })
        })
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state
        .user_service
        .logout(token)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let clear_cookie = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";
    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, HeaderValue::from_static(clear_cookie));

    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/v1/auth/me - current user
async fn get_current_user(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0.into())
}

/// Extract the client IP from proxy headers (X-Forwarded-For, X-Real-IP)
fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                return Some(ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.1, 172.16.0.1".parse().unwrap());
        headers.insert("x-real-ip", "192.168.1.1".parse().unwrap());
        assert_eq!(extract_ip_address(&headers), Some("10.0.0.1".to_string()));
    }

    #[test]
    fn test_extract_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "192.168.1.1".parse().unwrap());
        assert_eq!(extract_ip_address(&headers), Some("192.168.1.1".to_string()));
    }

    #[test]
    fn test_session_cookie_format() {
        let cookie = session_cookie("abc", 604800);
        assert!(cookie.contains("session=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));
    }
}
