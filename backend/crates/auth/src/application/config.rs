//! Application Configuration
//!
//! Configuration for the Auth application layer. Built by the binary from
//! environment variables.

use std::fmt;

use chrono::Duration;
use platform::jwt::JwtCodec;
use platform::rate_limit::RateLimitConfig;

/// Fallback secret used when `JWT_SECRET` is not set
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-this";

/// SMTP relay settings; mail is only logged without them
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SmtpConfig {
    pub const DEFAULT_PORT: u16 = 587;
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Access token lifetime
    pub jwt_ttl: Duration,
    /// Password reset token lifetime
    pub reset_token_ttl: Duration,
    /// Base URL of the frontend, used to build reset links
    pub frontend_url: String,
    /// Return the reset link in the forgot-password response (development)
    pub expose_reset_url: bool,
    /// `From` header of outgoing mail
    pub mail_from: String,
    pub mail_from_name: String,
    /// Relay for outgoing mail
    pub smtp: Option<SmtpConfig>,
    /// Honor `X-Forwarded-For` for rate limiting. Only safe behind a reverse
    /// proxy that overwrites the header.
    pub trust_proxy: bool,
    /// Per client IP
    pub login_rate_limit: RateLimitConfig,
    /// Per client IP
    pub forgot_password_rate_limit: RateLimitConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_ttl: Duration::hours(24),
            reset_token_ttl: Duration::hours(1),
            frontend_url: "http://localhost:3000".to_string(),
            expose_reset_url: false,
            mail_from: "noreply@localhost".to_string(),
            mail_from_name: "Blog App".to_string(),
            smtp: None,
            trust_proxy: false,
            login_rate_limit: RateLimitConfig::new(10, 60),
            forgot_password_rate_limit: RateLimitConfig::new(5, 15 * 60),
        }
    }
}

impl AuthConfig {
    /// Development defaults: reset links are returned to the caller
    pub fn development() -> Self {
        Self {
            expose_reset_url: true,
            ..Default::default()
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn jwt_codec(&self) -> JwtCodec {
        JwtCodec::new(self.jwt_secret.as_bytes(), self.jwt_ttl)
    }

    /// `{frontend_url}/reset-password?token=<token>`
    pub fn reset_url(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        )
    }

    /// `"Name <address>"`
    pub fn mail_from_header(&self) -> String {
        format!("{} <{}>", self.mail_from_name, self.mail_from)
    }
}
