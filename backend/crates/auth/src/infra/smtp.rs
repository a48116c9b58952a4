//! SMTP mailer
//!
//! Delivers mail through an SMTP relay with `lettre`. The transport mode
//! follows the port: 465 is implicit TLS, 25 and 1025 are plain (local
//! relays and mail catchers), anything else upgrades with STARTTLS.

use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::application::config::SmtpConfig;
use crate::domain::mailer::{MailMessage, Mailer};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    ImplicitTls,
    StartTls,
    Plain,
}

impl SmtpSecurity {
    pub fn for_port(port: u16) -> Self {
        match port {
            465 => SmtpSecurity::ImplicitTls,
            25 | 1025 => SmtpSecurity::Plain,
            _ => SmtpSecurity::StartTls,
        }
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// `from` is a full header value such as `"Blog App <noreply@localhost>"`.
    /// No connection is made until the first message is sent.
    pub fn new(config: &SmtpConfig, from: &str) -> AuthResult<Self> {
        let from: Mailbox = from
            .parse()
            .map_err(|e| AuthError::Internal(format!("Invalid sender address: {e}")))?;

        let tls_error = |e: lettre::transport::smtp::Error| {
            AuthError::Internal(format!("SMTP TLS setup failed: {e}"))
        };
        let mut builder = match SmtpSecurity::for_port(config.port) {
            SmtpSecurity::ImplicitTls => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host).map_err(tls_error)?
            }
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(tls_error)?
            }
            SmtpSecurity::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        }
        .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::info!(host = %config.host, port = config.port, "SMTP mailer configured");
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, message: &MailMessage) -> AuthResult<Message> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| AuthError::Internal(format!("Invalid recipient address: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
            .map_err(|e| AuthError::Internal(format!("Cannot build mail: {e}")))
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, message: &MailMessage) -> AuthResult<()> {
        let email = self.build_message(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| AuthError::Internal(format!("SMTP delivery failed: {e}")))?;

        tracing::info!(to = %message.to, subject = %message.subject, "Mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 1025,
            username: None,
            password: None,
        }
    }

    fn message(to: &str) -> MailMessage {
        MailMessage {
            to: to.to_string(),
            subject: "Password reset request".to_string(),
            html_body: "<p>reset</p>".to_string(),
        }
    }

    #[test]
    fn test_security_for_port() {
        assert_eq!(SmtpSecurity::for_port(465), SmtpSecurity::ImplicitTls);
        assert_eq!(SmtpSecurity::for_port(587), SmtpSecurity::StartTls);
        assert_eq!(SmtpSecurity::for_port(25), SmtpSecurity::Plain);
        assert_eq!(SmtpSecurity::for_port(1025), SmtpSecurity::Plain);
    }

    #[tokio::test]
    async fn test_build_message() {
        let mailer = SmtpMailer::new(&config(), "Blog App <noreply@localhost>").unwrap();
        let email = mailer.build_message(&message("alice@example.com")).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();

        assert!(raw.contains("Blog App"));
        assert!(raw.contains("<noreply@localhost>"));
        assert!(raw.contains("To: alice@example.com"));
        assert!(raw.contains("Subject: Password reset request"));
        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("<p>reset</p>"));
    }

    #[tokio::test]
    async fn test_invalid_addresses() {
        assert!(SmtpMailer::new(&config(), "not an address").is_err());

        let mailer = SmtpMailer::new(&config(), "noreply@localhost").unwrap();
        assert!(mailer.build_message(&message("nobody")).is_err());
    }
}
