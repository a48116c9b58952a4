//! Username Value Object
//!
//! Public handle shown as a post's author.
//!
//! ## Invariants
//! - 3 to 30 characters after NFKC normalization and trimming
//! - only ASCII letters, digits, `_`, `.` and `-`
//! - not a reserved route-like word
//!
//! Case is preserved for display; uniqueness is case-insensitive (enforced
//! by a `LOWER(username)` index).

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 30;

/// Names that would be confusing next to API routes or in templates
const RESERVED_USERNAMES: &[&str] = &[
    "root", "system", "api", "me", "null", "undefined", "anonymous", "uploads",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("Username is required")]
    Empty,

    #[error("Username must be between {min} and {max} characters", min = USERNAME_MIN_LENGTH, max = USERNAME_MAX_LENGTH)]
    Length,

    #[error("Username may only contain letters, numbers, '_', '.' and '-' (found '{0}')")]
    InvalidCharacter(char),

    #[error("'{0}' is a reserved username")]
    Reserved(String),
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UsernameError> {
        let normalized: String = input.as_ref().nfkc().collect::<String>().trim().to_string();

        if normalized.is_empty() {
            return Err(UsernameError::Empty);
        }

        let length = normalized.chars().count();
        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
            return Err(UsernameError::Length);
        }

        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        {
            return Err(UsernameError::InvalidCharacter(bad));
        }

        let lower = normalized.to_ascii_lowercase();
        if RESERVED_USERNAMES.contains(&lower.as_str()) {
            return Err(UsernameError::Reserved(normalized));
        }

        Ok(Self(normalized))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username({})", self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
