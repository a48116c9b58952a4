//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Method names carry the resource so one type can implement every trait
//! without ambiguous calls.

use kernel::id::{CategoryId, CommentId, PostId, TagId};
use kernel::pagination::PageRequest;

use crate::domain::entity::{
    category::{Category, NewCategory},
    comment::{Comment, NewComment},
    post::{NewPost, Post, PostDetails, PostFilter},
    tag::{NewTag, Tag},
};
use crate::domain::value_object::slug::Slug;
use crate::error::BlogResult;

#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    /// Newest first, with the total number of matches
    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> BlogResult<(Vec<PostDetails>, u64)>;

    async fn find_post(&self, id: PostId) -> BlogResult<Option<PostDetails>>;

    async fn find_post_by_slug(&self, slug: &Slug) -> BlogResult<Option<PostDetails>>;

    /// Ignores the post `except`, if given
    async fn post_slug_taken(&self, slug: &Slug, except: Option<PostId>) -> BlogResult<bool>;

    /// Insert the post and its tag links
    async fn create_post(&self, post: &NewPost, tag_ids: &[TagId]) -> BlogResult<PostId>;

    /// `Some(tag_ids)` replaces the tag links
    async fn update_post(&self, post: &Post, tag_ids: Option<&[TagId]>) -> BlogResult<()>;

    /// Tag links and comments go with it
    async fn delete_post(&self, id: PostId) -> BlogResult<bool>;
}

#[trait_variant::make(CategoryRepository: Send)]
pub trait LocalCategoryRepository {
    /// Ordered by name
    async fn list_categories(&self) -> BlogResult<Vec<Category>>;

    async fn find_category(&self, id: CategoryId) -> BlogResult<Option<Category>>;

    async fn find_category_by_slug(&self, slug: &Slug) -> BlogResult<Option<Category>>;

    /// Case-insensitive
    async fn category_name_taken(&self, name: &str, except: Option<CategoryId>) -> BlogResult<bool>;

    async fn category_slug_taken(&self, slug: &Slug, except: Option<CategoryId>) -> BlogResult<bool>;

    /// Drafts are counted only with `include_drafts`
    async fn count_category_posts(&self, id: CategoryId, include_drafts: bool) -> BlogResult<u64>;

    async fn create_category(&self, category: &NewCategory) -> BlogResult<Category>;

    async fn update_category(&self, category: &Category) -> BlogResult<()>;

    /// Posts in the category keep existing without one
    async fn delete_category(&self, id: CategoryId) -> BlogResult<bool>;
}

#[trait_variant::make(TagRepository: Send)]
pub trait LocalTagRepository {
    /// Ordered by name
    async fn list_tags(&self) -> BlogResult<Vec<Tag>>;

    async fn find_tag(&self, id: TagId) -> BlogResult<Option<Tag>>;

    async fn find_tag_by_slug(&self, slug: &Slug) -> BlogResult<Option<Tag>>;

    /// Tags that exist among `ids`
    async fn find_tags(&self, ids: &[TagId]) -> BlogResult<Vec<Tag>>;

    /// Case-insensitive
    async fn tag_name_taken(&self, name: &str, except: Option<TagId>) -> BlogResult<bool>;

    async fn tag_slug_taken(&self, slug: &Slug, except: Option<TagId>) -> BlogResult<bool>;

    async fn count_tag_posts(&self, id: TagId, include_drafts: bool) -> BlogResult<u64>;

    async fn create_tag(&self, tag: &NewTag) -> BlogResult<Tag>;

    async fn update_tag(&self, tag: &Tag) -> BlogResult<()>;

    async fn delete_tag(&self, id: TagId) -> BlogResult<bool>;
}

#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    /// Newest first
    async fn list_comments(&self, post_id: PostId, include_unapproved: bool) -> BlogResult<Vec<Comment>>;

    async fn find_comment(&self, id: CommentId) -> BlogResult<Option<Comment>>;

    async fn create_comment(&self, comment: &NewComment) -> BlogResult<Comment>;

    async fn update_comment(&self, comment: &Comment) -> BlogResult<()>;

    async fn delete_comment(&self, id: CommentId) -> BlogResult<bool>;
}

/// Everything the blog handlers need from storage
pub trait BlogRepository:
    PostRepository + CategoryRepository + TagRepository + CommentRepository + Send + Sync + 'static
{
}

impl<T> BlogRepository for T where
    T: PostRepository + CategoryRepository + TagRepository + CommentRepository + Send + Sync + 'static
{
}
