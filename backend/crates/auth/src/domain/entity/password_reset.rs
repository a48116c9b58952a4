//! Password Reset Token
//!
//! The plain token only ever exists in the reset link. The database keeps
//! its SHA-256 digest and an expiry; presenting the token means hashing it
//! and comparing digests in constant time.

use chrono::{DateTime, Duration, Utc};
use platform::crypto::{constant_time_eq, random_token_hex, sha256_hex};

/// Random bytes per token (64 hex characters in the link)
pub const RESET_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken {
    digest: String,
    expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Generate a new token. Returns the plain token for the link and the
    /// record to persist.
    pub fn issue(now: DateTime<Utc>, ttl: Duration) -> (String, Self) {
        let plain = random_token_hex(RESET_TOKEN_BYTES);
        let record = Self {
            digest: sha256_hex(plain.as_bytes()),
            expires_at: now + ttl,
        };
        (plain, record)
    }

    pub fn from_db(digest: String, expires_at: DateTime<Utc>) -> Self {
        Self { digest, expires_at }
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Digest comparison only; expiry is checked separately
    pub fn matches(&self, plain: &str) -> bool {
        let candidate = sha256_hex(plain.trim().as_bytes());
        constant_time_eq(candidate.as_bytes(), self.digest.as_bytes())
    }
}
