//! URL slug
//!
//! `[a-z0-9]` words joined by single dashes, at most 100 characters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub const MAX_SLUG_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("Slug is required")]
    Empty,

    #[error("Slug must be at most {MAX_SLUG_LENGTH} characters")]
    TooLong,

    #[error("Slug may only contain lowercase letters, digits and single dashes between words")]
    InvalidFormat,
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a post title
    ///
    /// ```
    /// use blog::domain::value_object::slug::Slug;
    ///
    /// let slug = Slug::from_title("Hello, World! (2024)", chrono::Utc::now());
    /// assert_eq!(slug.as_str(), "hello-world-2024");
    /// ```
    pub fn from_title(title: &str, now: DateTime<Utc>) -> Self {
        Self::from_text(title, "post", now)
    }

    /// Derive a slug from free text. Text without any ASCII letter or digit
    /// falls back to `{fallback_prefix}-{unix_ts}`.
    pub fn from_text(text: &str, fallback_prefix: &str, now: DateTime<Utc>) -> Self {
        let mut slug = String::with_capacity(text.len().min(MAX_SLUG_LENGTH));
        let mut pending_dash = false;

        for ch in text.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
            if slug.len() >= MAX_SLUG_LENGTH {
                break;
            }
        }

        slug.truncate(MAX_SLUG_LENGTH);
        let slug = slug.trim_end_matches('-');

        if slug.is_empty() {
            return Self(format!("{}-{}", fallback_prefix, now.timestamp()));
        }
        Self(slug.to_string())
    }

    /// Validate a slug supplied by a client
    pub fn parse(input: &str) -> Result<Self, SlugError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SlugError::Empty);
        }
        if input.chars().count() > MAX_SLUG_LENGTH {
            return Err(SlugError::TooLong);
        }

        let valid_chars = input
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_chars || input.starts_with('-') || input.ends_with('-') || input.contains("--") {
            return Err(SlugError::InvalidFormat);
        }

        Ok(Self(input.to_string()))
    }

    /// Trusted value read from the database
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slug({})", self.0)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_from_title() {
        assert_eq!(Slug::from_title("Hello World", now()).as_str(), "hello-world");
        assert_eq!(
            Slug::from_title("  --Rust & Go: a comparison--  ", now()).as_str(),
            "rust-go-a-comparison"
        );
        assert_eq!(Slug::from_title("Café au lait", now()).as_str(), "caf-au-lait");
    }

    #[test]
    fn test_from_title_non_ascii_falls_back() {
        let slug = Slug::from_title("旅行の記録", now());
        assert_eq!(slug.as_str(), format!("post-{}", now().timestamp()));

        let slug = Slug::from_text("料理", "category", now());
        assert!(slug.as_str().starts_with("category-"));
    }

    #[test]
    fn test_from_title_is_capped() {
        let title = "word ".repeat(60);
        let slug = Slug::from_title(&title, now());
        assert!(slug.as_str().len() <= MAX_SLUG_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
        assert!(Slug::parse(slug.as_str()).is_ok());
    }

    #[test]
    fn test_parse() {
        assert!(Slug::parse("go-introduction").is_ok());
        assert!(Slug::parse("2024").is_ok());
        assert_eq!(Slug::parse(" a-b ").unwrap().as_str(), "a-b");

        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
        assert_eq!(Slug::parse(&"a".repeat(101)), Err(SlugError::TooLong));
        assert_eq!(Slug::parse("Hello"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("-a"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("a-"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("a--b"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("a_b"), Err(SlugError::InvalidFormat));
    }
}
