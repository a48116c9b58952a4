//! Blog API server
//!
//! - `config` - environment-driven server configuration
//! - `app` - router assembly and cross-cutting layers
//! - `db` - pool, migrations and seeding shared with `blogctl`

pub mod app;
pub mod config;
pub mod db;

pub use app::build_router;
pub use config::ServerConfig;
