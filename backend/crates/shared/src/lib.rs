//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of the blog's vocabulary:
//! - Common error types and result aliases
//! - Typed integer IDs for every persisted entity
//! - The JSON response envelope and pagination rules shared by all routers
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod pagination;
pub mod response;
