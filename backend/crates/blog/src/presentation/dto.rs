//! API DTOs (Data Transfer Objects)
//!
//! Required string fields default to empty so a missing field is reported
//! by the use case as a 400 with a readable message.

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, CommentId, PostId, TagId, UserId};
use kernel::pagination::PageRequest;
use serde::{Deserialize, Deserializer, Serialize};

use crate::application::{
    CreateCategoryInput, CreateCommentInput, CreatePostInput, CreateTagInput, ListPostsQuery,
    UpdateCategoryInput, UpdateCommentInput, UpdatePostInput, UpdateTagInput, UploadedFile,
};
use crate::domain::entity::{
    category::Category,
    comment::Comment,
    post::{AuthorSummary, PostDetails},
    tag::Tag,
};

/// Absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
/// Use together with `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AuthorResponse {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
}

impl From<&AuthorSummary> for AuthorResponse {
    fn from(author: &AuthorSummary) -> Self {
        Self {
            id: author.id,
            username: author.username.clone(),
            display_name: author.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Only on single-category lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.as_str().to_string(),
            description: category.description.clone(),
            post_count: None,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

impl CategoryResponse {
    pub fn with_post_count(mut self, count: u64) -> Self {
        self.post_count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagResponse {
    pub id: TagId,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Tag> for TagResponse {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            slug: tag.slug.as_str().to_string(),
            post_count: None,
            created_at: tag.created_at,
            updated_at: tag.updated_at,
        }
    }
}

impl TagResponse {
    pub fn with_post_count(mut self, count: u64) -> Self {
        self.post_count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub author_id: UserId,
    pub category_id: Option<CategoryId>,
    pub author: AuthorResponse,
    pub category: Option<CategoryResponse>,
    pub tags: Vec<TagResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PostDetails> for PostResponse {
    fn from(details: &PostDetails) -> Self {
        let post = &details.post;
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.as_str().to_string(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
            image_url: post.image_url.clone(),
            published: post.published,
            author_id: post.author_id,
            category_id: post.category_id,
            author: AuthorResponse::from(&details.author),
            category: details.category.as_ref().map(CategoryResponse::from),
            tags: details.tags.iter().map(TagResponse::from).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: String,
    pub email: String,
    pub content: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author: comment.author.clone(),
            email: comment.email.clone(),
            content: comment.content.clone(),
            approved: comment.approved,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub url: String,
    pub size: u64,
}

impl From<UploadedFile> for UploadResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            filename: file.filename,
            url: file.url,
            size: file.size,
        }
    }
}

// ============================================================================
// Posts
// ============================================================================

/// `GET /posts` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_drafts: bool,
}

impl From<ListPostsParams> for ListPostsQuery {
    fn from(params: ListPostsParams) -> Self {
        Self {
            page: PageRequest::from_signed(params.page, params.limit),
            category: params.category,
            tag: params.tag,
            search: params.search,
            include_drafts: params.include_drafts,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

impl From<CreatePostRequest> for CreatePostInput {
    fn from(req: CreatePostRequest) -> Self {
        Self {
            title: req.title,
            slug: req.slug,
            content: req.content,
            excerpt: req.excerpt,
            image_url: req.image_url,
            published: req.published,
            category_id: req.category_id,
            tag_ids: req.tag_ids,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<CategoryId>>,
    pub tag_ids: Option<Vec<TagId>>,
}

impl From<UpdatePostRequest> for UpdatePostInput {
    fn from(req: UpdatePostRequest) -> Self {
        Self {
            title: req.title,
            slug: req.slug,
            content: req.content,
            excerpt: req.excerpt,
            image_url: req.image_url,
            published: req.published,
            category_id: req.category_id,
            tag_ids: req.tag_ids,
        }
    }
}

// ============================================================================
// Categories / Tags
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl From<CreateCategoryRequest> for CreateCategoryInput {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl From<UpdateCategoryRequest> for UpdateCategoryInput {
    fn from(req: UpdateCategoryRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
}

impl From<CreateTagRequest> for CreateTagInput {
    fn from(req: CreateTagRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl From<UpdateTagRequest> for UpdateTagInput {
    fn from(req: UpdateTagRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub content: String,
}

impl From<CreateCommentRequest> for CreateCommentInput {
    fn from(req: CreateCommentRequest) -> Self {
        Self {
            author: req.author,
            email: req.email,
            content: req.content,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
    pub approved: Option<bool>,
}

impl From<UpdateCommentRequest> for UpdateCommentInput {
    fn from(req: UpdateCommentRequest) -> Self {
        Self {
            content: req.content,
            approved: req.approved,
        }
    }
}
