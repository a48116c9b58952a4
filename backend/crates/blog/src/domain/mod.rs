//! Domain Layer
//!
//! Entities, the slug value object, and the repository and storage traits.

pub mod entity;
pub mod repository;
pub mod storage;
pub mod value_object;
pub mod viewer;

// Re-exports
pub use entity::{
    category::{Category, NewCategory},
    comment::{Comment, NewComment},
    post::{AuthorSummary, NewPost, Post, PostDetails, PostFilter},
    tag::{NewTag, Tag},
};
pub use repository::{
    BlogRepository, CategoryRepository, CommentRepository, PostRepository, TagRepository,
};
pub use storage::FileStore;
pub use value_object::{id_or_slug::IdOrSlug, slug::Slug};
pub use viewer::Viewer;
