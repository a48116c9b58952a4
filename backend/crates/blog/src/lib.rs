//! Blog Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, slug value object, repository and storage traits
//! - `application/` - Use cases, upload rules, sample content
//! - `infra/` - PostgreSQL repository, disk storage
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Posts with categories and tags, paginated listing with filters and
//!   search, lookup by id or slug
//! - Drafts visible only to their author and admins
//! - Admin-managed categories and tags
//! - Comments held for moderation until an admin approves them
//! - File upload to a local directory served under `/uploads`
//!
//! Authentication is provided by the `auth` crate: routes take its
//! `CurrentUser` / `MaybeUser` extractors behind its middleware.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use application::config::BlogConfig;
pub use error::{BlogError, BlogResult};
pub use infra::{postgres::PgBlogRepository, storage::DiskFileStore};
pub use presentation::router::{blog_router, blog_router_generic};

pub mod seed {
    pub use crate::application::seed::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
