//! Logging mailer
//!
//! Renders the message and writes it to the log instead of a mail server.

use crate::application::config::AuthConfig;
use crate::application::templates::render_rfc822;
use crate::domain::mailer::{MailMessage, Mailer};
use crate::error::AuthResult;
use crate::infra::smtp::SmtpMailer;

#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    /// `from` is a full header value such as `"Blog App <noreply@localhost>"`
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> AuthResult<()> {
        let raw = render_rfc822(&self.from, message);
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            bytes = raw.len(),
            "Mail queued"
        );
        tracing::debug!(message = %raw, "Mail content");
        Ok(())
    }
}

/// Mailer chosen from configuration: SMTP when a relay is set, the log
/// otherwise
pub enum ConfiguredMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl ConfiguredMailer {
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let from = config.mail_from_header();
        match &config.smtp {
            Some(smtp) => Ok(ConfiguredMailer::Smtp(SmtpMailer::new(smtp, &from)?)),
            None => {
                tracing::info!("SMTP_HOST not set, outgoing mail is written to the log");
                Ok(ConfiguredMailer::Log(LogMailer::new(from)))
            }
        }
    }
}

impl Mailer for ConfiguredMailer {
    async fn send(&self, message: &MailMessage) -> AuthResult<()> {
        match self {
            ConfiguredMailer::Smtp(mailer) => Mailer::send(mailer, message).await,
            ConfiguredMailer::Log(mailer) => Mailer::send(mailer, message).await,
        }
    }
}
