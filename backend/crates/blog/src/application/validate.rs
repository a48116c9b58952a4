//! Input checks shared by the use cases

use crate::domain::value_object::slug::Slug;
use crate::error::{BlogError, BlogResult};

/// Trimmed, non-empty, at most `max_chars` characters
pub(crate) fn required_text(label: &str, value: &str, max_chars: usize) -> BlogResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BlogError::Validation(format!("{label} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(BlogError::Validation(format!(
            "{label} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

/// Trimmed; blank becomes `None`
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Client slug when given (and not blank), otherwise `derive()`
pub(crate) fn slug_or_derive(explicit: Option<&str>, derive: impl FnOnce() -> Slug) -> BlogResult<Slug> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => Slug::parse(slug).map_err(|e| BlogError::Validation(e.to_string())),
        None => Ok(derive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("Title", "  Hi ", 10).unwrap(), "Hi");
        assert!(matches!(
            required_text("Title", "   ", 10),
            Err(BlogError::Validation(ref m)) if m == "Title is required"
        ));
        assert!(matches!(
            required_text("Title", "abcdef", 5),
            Err(BlogError::Validation(ref m)) if m == "Title must be at most 5 characters"
        ));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(optional_text(Some("   ".to_string())), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_slug_or_derive() {
        let derived = || Slug::from_db("derived");
        assert_eq!(slug_or_derive(None, derived).unwrap().as_str(), "derived");
        assert_eq!(slug_or_derive(Some(" "), derived).unwrap().as_str(), "derived");
        assert_eq!(slug_or_derive(Some("given"), derived).unwrap().as_str(), "given");
        assert!(slug_or_derive(Some("Not Valid"), derived).is_err());
    }
}
