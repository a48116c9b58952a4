//! Post Entity

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, PostId, TagId, UserId};

use crate::domain::entity::{category::Category, tag::Tag};
use crate::domain::value_object::slug::Slug;
use crate::domain::viewer::Viewer;

/// Characters of content used for a derived excerpt
pub const EXCERPT_LENGTH: usize = 160;

#[derive(Debug, Clone)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: Slug,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub author_id: UserId,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Drafts are visible to their author and to admins only
    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        self.published || self.can_be_modified_by(viewer)
    }

    pub fn can_be_modified_by(&self, viewer: &Viewer) -> bool {
        viewer.is_admin || viewer.user_id == Some(self.author_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: Slug,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub author_id: UserId,
    pub category_id: Option<CategoryId>,
}

/// Public fields of the author
#[derive(Debug, Clone)]
pub struct AuthorSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
}

/// A post with its author, category and tags resolved
#[derive(Debug, Clone)]
pub struct PostDetails {
    pub post: Post,
    pub author: AuthorSummary,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
}

/// Filters for listing posts; every `Some` narrows the result
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub include_drafts: bool,
    pub category_slug: Option<String>,
    pub tag_slug: Option<String>,
    /// Case-insensitive substring of title, content or excerpt
    pub search: Option<String>,
}

/// First [`EXCERPT_LENGTH`] characters of `content` with whitespace runs
/// collapsed
pub fn excerpt_from_content(content: &str) -> String {
    content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(EXCERPT_LENGTH)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Sorted, without duplicates
pub fn normalize_tag_ids(tag_ids: &[TagId]) -> Vec<TagId> {
    let mut ids = tag_ids.to_vec();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(published: bool) -> Post {
        let now = Utc::now();
        Post {
            id: PostId::new(1),
            title: "Title".to_string(),
            slug: Slug::from_db("title"),
            content: "Body".to_string(),
            excerpt: "Body".to_string(),
            image_url: None,
            published,
            author_id: UserId::new(10),
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_draft_visibility() {
        let draft = post(false);
        assert!(!draft.is_visible_to(&Viewer::anonymous()));
        assert!(!draft.is_visible_to(&Viewer::user(UserId::new(11), false)));
        assert!(draft.is_visible_to(&Viewer::user(UserId::new(10), false)));
        assert!(draft.is_visible_to(&Viewer::user(UserId::new(11), true)));

        assert!(post(true).is_visible_to(&Viewer::anonymous()));
    }

    #[test]
    fn test_modification_rights() {
        let published = post(true);
        assert!(!published.can_be_modified_by(&Viewer::anonymous()));
        assert!(!published.can_be_modified_by(&Viewer::user(UserId::new(11), false)));
        assert!(published.can_be_modified_by(&Viewer::user(UserId::new(10), false)));
        assert!(published.can_be_modified_by(&Viewer::user(UserId::new(11), true)));
    }

    #[test]
    fn test_excerpt_from_content() {
        assert_eq!(excerpt_from_content("  Short\n\nbody  "), "Short body");

        let long = "あ".repeat(200);
        let excerpt = excerpt_from_content(&long);
        assert_eq!(excerpt.chars().count(), EXCERPT_LENGTH);
    }

    #[test]
    fn test_normalize_tag_ids() {
        let ids = [TagId::new(3), TagId::new(1), TagId::new(3)];
        assert_eq!(normalize_tag_ids(&ids), vec![TagId::new(1), TagId::new(3)]);
    }
}
