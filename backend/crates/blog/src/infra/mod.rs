//! Infrastructure Layer
//!
//! PostgreSQL repository and disk storage for uploads.

pub mod postgres;
pub mod storage;

pub use postgres::PgBlogRepository;
pub use storage::DiskFileStore;
