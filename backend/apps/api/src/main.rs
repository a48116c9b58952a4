//! API Server Entry Point
//!
//! Uses `anyhow` for startup errors; request-level errors go through
//! `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use api::{ServerConfig, build_router, db};
use auth::{AuthGuard, ConfiguredMailer, PgAuthRepository, auth_router};
use blog::{DiskFileStore, PgBlogRepository, blog_router};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,blog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    if config.auth.uses_default_secret() {
        if config.environment.is_production() {
            tracing::warn!("JWT_SECRET is not set; tokens are signed with the built-in default secret");
        } else {
            tracing::info!("Using the development JWT secret");
        }
    }

    let pool = db::connect(&config.database_url, config.db_max_connections).await?;

    if config.auto_migrate {
        db::migrate(&pool).await?;
        if config.seed_data {
            db::seed_database(&pool, env::var("ADMIN_PASSWORD").ok()).await?;
        }
    } else if config.seed_data {
        tracing::warn!("SEED_DATA is ignored unless AUTO_MIGRATE is set");
    }

    // Errors here should not prevent server startup
    let auth_repo = PgAuthRepository::new(pool.clone());
    match auth_repo.clear_expired_reset_tokens().await {
        Ok(cleared) => tracing::info!(tokens_cleared = cleared, "Reset token cleanup completed"),
        Err(e) => tracing::warn!(error = %e, "Reset token cleanup failed, continuing anyway"),
    }

    let store = DiskFileStore::new(config.blog.upload_dir.clone());
    store
        .ensure_dir()
        .await
        .with_context(|| format!("cannot create upload directory {}", config.blog.upload_dir.display()))?;

    let guard = AuthGuard::from_config(&config.auth);
    let mailer = ConfiguredMailer::from_config(&config.auth).context("invalid mail configuration")?;
    let api = auth_router(auth_repo, mailer, config.auth.clone()).merge(blog_router(
        PgBlogRepository::new(pool.clone()),
        store,
        config.blog.clone(),
        guard,
    ));

    let app = build_router(api, &config);

    let addr = config.bind_addr();
    tracing::info!(environment = ?config.environment, "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
