//! Auth Router
//!
//! Paths are relative to the `/api` prefix the binary nests this under.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use platform::rate_limit::InMemoryRateLimiter;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::mailer::Mailer;
use crate::domain::repository::UserRepository;
use crate::infra::{mailer::ConfiguredMailer, postgres::PgAuthRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthGuard, require_auth};

/// Create the Auth router with the PostgreSQL repository and the configured mailer
pub fn auth_router(repo: PgAuthRepository, mailer: ConfiguredMailer, config: AuthConfig) -> Router {
    auth_router_generic(repo, mailer, config)
}

/// Create a generic Auth router for any repository and mailer
pub fn auth_router_generic<R, M>(repo: R, mailer: M, config: AuthConfig) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let guard = AuthGuard::from_config(&config);
    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        jwt: guard.codec(),
        config: Arc::new(config),
        limiter: Arc::new(InMemoryRateLimiter::new()),
    };

    let protected = Router::new()
        .route("/me", get(handlers::me::<R, M>))
        .route("/auth/me", get(handlers::me::<R, M>))
        .route("/password/change", post(handlers::change_password::<R, M>))
        .route_layer(from_fn_with_state(guard, require_auth));

    Router::new()
        .route("/auth/register", post(handlers::register::<R, M>))
        .route("/auth/login", post(handlers::login::<R, M>))
        .route("/auth/logout", post(handlers::logout))
        .route("/password/forgot", post(handlers::forgot_password::<R, M>))
        .route("/password/verify-token", get(handlers::verify_reset_token::<R, M>))
        .route("/password/reset", post(handlers::reset_password::<R, M>))
        .merge(protected)
        .with_state(state)
}
