//! Tag Entity

use chrono::{DateTime, Utc};
use kernel::id::TagId;

use crate::domain::value_object::slug::Slug;

#[derive(Debug, Clone)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: Slug,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub slug: Slug,
}
