//! Presentation Layer
//!
//! HTTP handlers, DTOs and the router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::BlogAppState;
pub use router::{blog_router, blog_router_generic};
