//! API layer - HTTP handlers and routing
//!
//! All HTTP endpoints for the Vitrine service:
//! - Project API endpoints (GitHub aggregation + AI summaries)
//! - Blog post API endpoints
//! - Auth API endpoints
//! - Site info endpoint

pub mod auth;
pub mod middleware;
pub mod posts;
pub mod projects;
pub mod responses;
pub mod site;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, RequestStats};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/admin/posts", posts::admin_router())
        .nest("/admin/summaries", projects::admin_summaries_router())
        .nest("/admin/projects", projects::admin_projects_router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/projects", projects::public_router())
        .nest("/posts", posts::public_router())
        .nest("/auth", auth::public_router())
        .nest("/site", site::router())
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", cors_origin))?;

    // CORS allows credentials so the SPA can use cookie sessions
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::CompletionClient;
    use crate::cache::create_cache;
    use crate::config::{AiConfig, CacheConfig, GitHubConfig};
    use crate::db::repositories::{SqlxPostRepository, SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::github::GitHubClient;
    use crate::services::{
        markdown::MarkdownRenderer, post::PostService, project::ProjectService,
        summary::SummaryService, user::UserService, LoginRateLimiter,
    };
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;

    /// Build a server over a fresh in-memory database. External clients
    /// point at an unroutable base; these tests exercise posts and auth.
    async fn test_server() -> TestServer {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let cache = create_cache(&CacheConfig::default());
        let github_config = GitHubConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            ..GitHubConfig::default()
        };
        let ai_config = AiConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            api_key: Some("sk-test".to_string()),
            ..AiConfig::default()
        };

        let state = AppState {
            post_service: Arc::new(PostService::new(
                SqlxPostRepository::boxed(pool.clone()),
                cache.clone(),
                MarkdownRenderer::new(),
            )),
            user_service: Arc::new(UserService::new(
                SqlxUserRepository::boxed(pool.clone()),
                SqlxSessionRepository::boxed(pool),
                7,
            )),
            project_service: Arc::new(ProjectService::new(
                Arc::new(GitHubClient::new(&github_config).unwrap()),
                cache,
            )),
            summary_service: Arc::new(SummaryService::new(Arc::new(
                CompletionClient::new(&ai_config).unwrap(),
            ))),
            rate_limiter: Arc::new(LoginRateLimiter::new()),
            request_stats: Arc::new(RequestStats::new()),
        };

        let app = build_router(state, "http://localhost:3000").unwrap();
        TestServer::new(app).unwrap()
    }

    /// Register the owner and return a session token
    async fn register_owner(server: &TestServer) -> String {
        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": "alex",
                "password": "s3cret-passphrase",
                "display_name": "Alexandre"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<serde_json::Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_admin_routes_require_auth() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/admin/posts")
            .json(&json!({"title": "x", "author": "a", "content": "b"}))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_registration_closes_after_first_user() {
        let server = test_server().await;

        let before = server.get("/api/v1/auth/has-owner").await;
        assert_eq!(before.json::<serde_json::Value>()["has_owner"], json!(false));

        register_owner(&server).await;

        let after = server.get("/api/v1/auth/has-owner").await;
        assert_eq!(after.json::<serde_json::Value>()["has_owner"], json!(true));

        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({"username": "mallory", "password": "long-enough-pw"}))
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_post_lifecycle_through_api() {
        let server = test_server().await;
        let token = register_owner(&server).await;

        // Create a published post
        let created = server
            .post("/api/v1/admin/posts")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Hello, World!",
                "author": "Alexandre",
                "content": "# Hi\n\nBody.",
                "status": "published"
            }))
            .await;
        created.assert_status(axum::http::StatusCode::CREATED);
        let body = created.json::<serde_json::Value>();
        assert_eq!(body["slug"], json!("hello-world"));
        assert!(body["content_html"]
            .as_str()
            .unwrap()
            .contains("<h1>Hi</h1>"));

        // Visible publicly
        let public = server.get("/api/v1/posts/hello-world").await;
        public.assert_status_ok();

        let listing = server.get("/api/v1/posts").await;
        let listing = listing.json::<serde_json::Value>();
        assert_eq!(listing["total"], json!(1));

        // Delete and confirm it is gone
        let deleted = server
            .delete("/api/v1/admin/posts/hello-world")
            .authorization_bearer(&token)
            .await;
        deleted.assert_status(axum::http::StatusCode::NO_CONTENT);

        let missing = server.get("/api/v1/posts/hello-world").await;
        missing.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_drafts_are_admin_only() {
        let server = test_server().await;
        let token = register_owner(&server).await;

        server
            .post("/api/v1/admin/posts")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Work In Progress",
                "author": "Alexandre",
                "content": "draft body"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        // Hidden from the public surface
        server
            .get("/api/v1/posts/work-in-progress")
            .await
            .assert_status(axum::http::StatusCode::NOT_FOUND);
        let public = server.get("/api/v1/posts").await.json::<serde_json::Value>();
        assert_eq!(public["total"], json!(0));

        // Present on the admin surface
        let admin = server
            .get("/api/v1/admin/posts")
            .authorization_bearer(&token)
            .await
            .json::<serde_json::Value>();
        assert_eq!(admin["total"], json!(1));
    }

    #[tokio::test]
    async fn test_export_then_import_roundtrip() {
        let server = test_server().await;
        let token = register_owner(&server).await;

        server
            .post("/api/v1/admin/posts")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Exported",
                "author": "Alexandre",
                "content": "# Exported\n\nBody.",
                "status": "published",
                "tags": ["rust"]
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let exported = server
            .get("/api/v1/admin/posts/exported/export")
            .authorization_bearer(&token)
            .await;
        exported.assert_status_ok();
        let document = exported.text();
        assert!(document.starts_with("---\n"));

        // Re-import under a fresh slug
        let document = document.replace("slug: exported", "slug: exported-copy");
        let imported = server
            .post("/api/v1/admin/posts/import")
            .authorization_bearer(&token)
            .text(document)
            .await;
        imported.assert_status(axum::http::StatusCode::CREATED);
        let body = imported.json::<serde_json::Value>();
        assert_eq!(body["slug"], json!("exported-copy"));
        assert_eq!(body["title"], json!("Exported"));
    }

    #[tokio::test]
    async fn test_login_logout_flow() {
        let server = test_server().await;
        register_owner(&server).await;

        let bad = server
            .post("/api/v1/auth/login")
            .json(&json!({"username": "alex", "password": "wrong"}))
            .await;
        bad.assert_status(axum::http::StatusCode::UNAUTHORIZED);

        let good = server
            .post("/api/v1/auth/login")
            .json(&json!({"username": "alex", "password": "s3cret-passphrase"}))
            .await;
        good.assert_status_ok();
        let token = good.json::<serde_json::Value>()["token"]
            .as_str()
            .unwrap()
            .to_string();

        let me = server
            .get("/api/v1/auth/me")
            .authorization_bearer(&token)
            .await;
        me.assert_status_ok();
        assert_eq!(me.json::<serde_json::Value>()["username"], json!("alex"));

        server
            .post("/api/v1/auth/logout")
            .authorization_bearer(&token)
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);

        server
            .get("/api/v1/auth/me")
            .authorization_bearer(&token)
            .await
            .assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_repeated_login_failures_rate_limit_the_username() {
        let server = test_server().await;
        register_owner(&server).await;

        // Each failure must be counted by the time the response arrives
        for _ in 0..5 {
            server
                .post("/api/v1/auth/login")
                .json(&json!({"username": "alex", "password": "wrong"}))
                .await
                .assert_status(axum::http::StatusCode::UNAUTHORIZED);
        }

        let limited = server
            .post("/api/v1/auth/login")
            .json(&json!({"username": "alex", "password": "s3cret-passphrase"}))
            .await;
        limited.assert_status(axum::http::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            limited.json::<serde_json::Value>()["error"]["code"],
            json!("RATE_LIMIT")
        );
    }

    #[tokio::test]
    async fn test_site_info_reports_stats() {
        let server = test_server().await;

        server.get("/api/v1/posts").await.assert_status_ok();
        let response = server.get("/api/v1/site").await;
        response.assert_status_ok();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], json!("vitrine"));
        assert!(body["total_requests"].as_u64().unwrap() >= 1);
    }
}
