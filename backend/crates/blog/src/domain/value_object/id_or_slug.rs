//! Path segment naming a record either by id or by slug

use kernel::id::Id;

use crate::domain::value_object::slug::{Slug, SlugError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrSlug<T> {
    Id(Id<T>),
    Slug(Slug),
}

impl<T> IdOrSlug<T> {
    /// All digits means an id, anything else must be a valid slug
    pub fn parse(segment: &str) -> Result<Self, SlugError> {
        let segment = segment.trim();
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = segment.parse::<Id<T>>() {
                return Ok(Self::Id(id));
            }
        }
        Slug::parse(segment).map(Self::Slug)
    }
}
