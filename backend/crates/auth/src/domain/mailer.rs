//! Outgoing mail

use crate::error::AuthResult;

/// A rendered HTML mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    async fn send(&self, message: &MailMessage) -> AuthResult<()>;
}
