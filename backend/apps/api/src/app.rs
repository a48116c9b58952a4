//! HTTP application assembly
//!
//! Wraps the domain routers under `/api`, serves uploaded files and adds
//! the cross-cutting layers (CORS, body limit, request tracing).

use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use kernel::error::app_error::AppError;
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{AllowedOrigins, ServerConfig};

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// JSON 404 for unmatched routes, in the same shape as handler errors
async fn not_found() -> AppError {
    AppError::not_found("Route not found")
}

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ]))
        .allow_headers(AllowHeaders::list([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .expose_headers(ExposeHeaders::list([header::CONTENT_LENGTH]))
        .max_age(CORS_MAX_AGE);

    match origins {
        // tower-http rejects credentials combined with a wildcard origin
        AllowedOrigins::Any => layer.allow_origin(AllowOrigin::any()),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer
                .allow_origin(AllowOrigin::list(values))
                .allow_credentials(true)
        }
    }
}

/// `api` holds the merged domain routers, mounted at `/api`
pub fn build_router(api: Router, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .nest_service(
            &config.blog.upload_public_path,
            ServeDir::new(&config.blog.upload_dir),
        )
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(config.body_limit()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
}
