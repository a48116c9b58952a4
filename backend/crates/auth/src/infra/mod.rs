//! Infrastructure Layer
//!
//! Database implementation and mail delivery (SMTP or log).

pub mod mailer;
pub mod postgres;
pub mod smtp;

pub use mailer::{ConfiguredMailer, LogMailer};
pub use postgres::PgAuthRepository;
pub use smtp::SmtpMailer;
