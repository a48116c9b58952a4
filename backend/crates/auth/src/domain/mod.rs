//! Domain Layer
//!
//! Contains entities, value objects, and the repository/mailer traits.

pub mod entity;
pub mod mailer;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{password_reset::PasswordResetToken, user::{NewUser, User}};
pub use mailer::{MailMessage, Mailer};
pub use repository::UserRepository;
