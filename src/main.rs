//! Vitrine - portfolio and blog backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrine::{
    ai::CompletionClient,
    api::{self, AppState, RequestStats},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{SqlxPostRepository, SqlxSessionRepository, SqlxUserRepository},
    },
    github::GitHubClient,
    services::{
        markdown::MarkdownRenderer, post::PostService, project::ProjectService,
        summary::SummaryService, user::UserService, LoginRateLimiter,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Vitrine backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache
    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized");

    // External clients
    let github = Arc::new(GitHubClient::new(&config.github)?);
    let completion = Arc::new(CompletionClient::new(&config.ai)?);
    tracing::info!("Showcasing GitHub account: {}", github.username());

    // Repositories
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());

    // Services
    let post_service = Arc::new(PostService::new(
        post_repo,
        cache.clone(),
        MarkdownRenderer::new(),
    ));
    let user_service = Arc::new(UserService::new(
        user_repo,
        session_repo,
        config.auth.session_days,
    ));
    let project_service = Arc::new(ProjectService::new(github, cache.clone()));
    let summary_service = Arc::new(SummaryService::new(completion));

    let rate_limiter = Arc::new(LoginRateLimiter::new());
    let request_stats = Arc::new(RequestStats::new());

    let state = AppState {
        post_service,
        user_service: user_service.clone(),
        project_service,
        summary_service,
        rate_limiter: rate_limiter.clone(),
        request_stats,
    };

    // Rate limiter cleanup task (runs every 5 minutes)
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Expired session purge task (runs hourly)
    {
        let users = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match users.purge_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Purged {} expired sessions", n),
                    Err(e) => tracing::warn!("Session purge failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
