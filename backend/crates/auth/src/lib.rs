//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and mailer traits
//! - `application/` - Use cases, mail templates, seeding
//! - `infra/` - PostgreSQL repository, SMTP and logging mailers
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Registration and login with email + password, stateless JWT bearer tokens
//! - Profile lookup (`/me`) and password change
//! - Password reset by emailed single-use token
//! - `require_auth` / `require_admin` middleware and `CurrentUser` extractor
//!   shared with the blog router
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Reset tokens are 32 random bytes, stored only as a SHA-256 digest,
//!   valid for one hour and cleared after use
//! - Login and forgot-password are rate limited per client IP

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use application::config::{AuthConfig, SmtpConfig};
pub use error::{AuthError, AuthResult};
pub use infra::{
    mailer::{ConfiguredMailer, LogMailer},
    postgres::PgAuthRepository,
    smtp::SmtpMailer,
};
pub use presentation::middleware::{AuthGuard, ClientIp, CurrentUser, MaybeUser, TrustProxy};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod seed {
    pub use crate::application::seed::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
