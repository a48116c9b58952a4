//! Blog Router
//!
//! Paths are relative to the `/api` prefix the binary nests this under.
//!
//! ```text
//! public  (attach_user)             GET posts, categories, tags, comments
//! bearer  (require_auth)            write posts, comment, upload
//! admin   (require_auth + admin)    write categories, tags, moderate comments
//! ```
//!
//! Single-resource GETs on categories and tags accept an id or a slug in
//! the `{id}` segment.

use std::sync::Arc;

use auth::AuthGuard;
use auth::middleware::{attach_user, require_admin, require_auth};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};

use crate::application::config::BlogConfig;
use crate::domain::repository::BlogRepository;
use crate::domain::storage::FileStore;
use crate::infra::{postgres::PgBlogRepository, storage::DiskFileStore};
use crate::presentation::handlers::{self, BlogAppState};

/// Multipart framing allowance on top of the file itself
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the Blog router with the PostgreSQL repository and disk storage
pub fn blog_router(
    repo: PgBlogRepository,
    store: DiskFileStore,
    config: BlogConfig,
    guard: AuthGuard,
) -> Router {
    blog_router_generic(repo, store, config, guard)
}

/// Create a generic Blog router for any repository and file store
pub fn blog_router_generic<R, S>(repo: R, store: S, config: BlogConfig, guard: AuthGuard) -> Router
where
    R: BlogRepository + Send + Sync + 'static,
    S: FileStore + Send + Sync + 'static,
{
    let upload_limit = usize::try_from(config.upload_max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let state = BlogAppState {
        repo: Arc::new(repo),
        store: Arc::new(store),
        config: Arc::new(config),
    };

    let public = Router::new()
        .route("/posts", get(handlers::list_posts::<R, S>))
        .route("/posts/{id}", get(handlers::get_post::<R, S>))
        .route("/posts/slug/{slug}", get(handlers::get_post_by_slug::<R, S>))
        .route("/posts/{id}/comments", get(handlers::list_comments::<R, S>))
        .route("/categories", get(handlers::list_categories::<R, S>))
        .route("/categories/{id}", get(handlers::get_category::<R, S>))
        .route("/tags", get(handlers::list_tags::<R, S>))
        .route("/tags/{id}", get(handlers::get_tag::<R, S>))
        .route_layer(from_fn_with_state(guard.clone(), attach_user));

    let authenticated = Router::new()
        .route("/posts", post(handlers::create_post::<R, S>))
        .route(
            "/posts/{id}",
            put(handlers::update_post::<R, S>).delete(handlers::delete_post::<R, S>),
        )
        .route("/posts/{id}/comments", post(handlers::create_comment::<R, S>))
        .route(
            "/upload",
            post(handlers::upload::<R, S>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(from_fn_with_state(guard.clone(), require_auth));

    // Layers run bottom-up: require_auth first, then require_admin
    let admin = Router::new()
        .route("/categories", post(handlers::create_category::<R, S>))
        .route(
            "/categories/{id}",
            put(handlers::update_category::<R, S>).delete(handlers::delete_category::<R, S>),
        )
        .route("/tags", post(handlers::create_tag::<R, S>))
        .route(
            "/tags/{id}",
            put(handlers::update_tag::<R, S>).delete(handlers::delete_tag::<R, S>),
        )
        .route(
            "/comments/{id}",
            put(handlers::update_comment::<R, S>).delete(handlers::delete_comment::<R, S>),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(guard, require_auth));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .with_state(state)
}
