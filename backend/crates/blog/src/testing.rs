//! In-memory doubles for use case and router tests

use std::collections::HashMap;

use chrono::Utc;
use kernel::id::{CategoryId, CommentId, PostId, TagId, UserId};
use kernel::pagination::PageRequest;
use tokio::sync::Mutex;

use crate::domain::entity::{
    category::{Category, NewCategory},
    comment::{Comment, NewComment},
    post::{AuthorSummary, NewPost, Post, PostDetails, PostFilter},
    tag::{NewTag, Tag},
};
use crate::domain::repository::{
    CategoryRepository, CommentRepository, PostRepository, TagRepository,
};
use crate::domain::storage::FileStore;
use crate::domain::value_object::slug::Slug;
use crate::error::{BlogError, BlogResult};

#[derive(Default)]
struct Tables {
    next_id: i64,
    authors: Vec<AuthorSummary>,
    posts: Vec<Post>,
    post_tags: Vec<(PostId, TagId)>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    comments: Vec<Comment>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn details(&self, post: &Post) -> BlogResult<PostDetails> {
        let author = self
            .authors
            .iter()
            .find(|a| a.id == post.author_id)
            .cloned()
            .ok_or_else(|| BlogError::Internal("post without author".to_string()))?;
        let category = post
            .category_id
            .and_then(|id| self.categories.iter().find(|c| c.id == id).cloned());
        let mut tags: Vec<Tag> = self
            .post_tags
            .iter()
            .filter(|(p, _)| *p == post.id)
            .filter_map(|(_, t)| self.tags.iter().find(|tag| tag.id == *t).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(PostDetails {
            post: post.clone(),
            author,
            category,
            tags,
        })
    }

    fn matches(&self, post: &Post, filter: &PostFilter) -> bool {
        if !filter.include_drafts && !post.published {
            return false;
        }
        if let Some(slug) = &filter.category_slug {
            let in_category = post.category_id.is_some_and(|id| {
                self.categories
                    .iter()
                    .any(|c| c.id == id && c.slug.as_str() == slug)
            });
            if !in_category {
                return false;
            }
        }
        if let Some(slug) = &filter.tag_slug {
            let tagged = self.post_tags.iter().any(|(p, t)| {
                *p == post.id
                    && self
                        .tags
                        .iter()
                        .any(|tag| tag.id == *t && tag.slug.as_str() == slug)
            });
            if !tagged {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let found = [&post.title, &post.content, &post.excerpt]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        true
    }

    fn set_tags(&mut self, post_id: PostId, tag_ids: &[TagId]) -> BlogResult<()> {
        if tag_ids.iter().any(|t| !self.tags.iter().any(|tag| tag.id == *t)) {
            return Err(BlogError::Validation("Referenced resource does not exist".to_string()));
        }
        self.post_tags.retain(|(p, _)| *p != post_id);
        self.post_tags.extend(tag_ids.iter().map(|t| (post_id, *t)));
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryBlogRepository {
    tables: Mutex<Tables>,
}

impl InMemoryBlogRepository {
    /// Register a user that posts can reference
    pub async fn add_author(&self, id: i64, username: &str) -> UserId {
        let id = UserId::new(id);
        self.tables.lock().await.authors.push(AuthorSummary {
            id,
            username: username.to_string(),
            display_name: Some(username.to_string()),
        });
        id
    }

    pub async fn post_count(&self) -> usize {
        self.tables.lock().await.posts.len()
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.lock().await.comments.len()
    }
}

impl PostRepository for InMemoryBlogRepository {
    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> BlogResult<(Vec<PostDetails>, u64)> {
        let tables = self.tables.lock().await;
        let mut matching: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|p| tables.matches(p, filter))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|p| tables.details(p))
            .collect::<BlogResult<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn find_post(&self, id: PostId) -> BlogResult<Option<PostDetails>> {
        let tables = self.tables.lock().await;
        tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.details(p))
            .transpose()
    }

    async fn find_post_by_slug(&self, slug: &Slug) -> BlogResult<Option<PostDetails>> {
        let tables = self.tables.lock().await;
        tables
            .posts
            .iter()
            .find(|p| &p.slug == slug)
            .map(|p| tables.details(p))
            .transpose()
    }

    async fn post_slug_taken(&self, slug: &Slug, except: Option<PostId>) -> BlogResult<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter()
            .any(|p| &p.slug == slug && Some(p.id) != except))
    }

    async fn create_post(&self, post: &NewPost, tag_ids: &[TagId]) -> BlogResult<PostId> {
        let mut tables = self.tables.lock().await;
        if tables.posts.iter().any(|p| p.slug == post.slug) {
            return Err(BlogError::Conflict("Slug already exists".to_string()));
        }
        if !tables.authors.iter().any(|a| a.id == post.author_id) {
            return Err(BlogError::Validation("Referenced resource does not exist".to_string()));
        }

        let now = Utc::now();
        let id = PostId::new(tables.next_id());
        tables.posts.push(Post {
            id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
            image_url: post.image_url.clone(),
            published: post.published,
            author_id: post.author_id,
            category_id: post.category_id,
            created_at: now,
            updated_at: now,
        });
        tables.set_tags(id, tag_ids)?;
        Ok(id)
    }

    async fn update_post(&self, post: &Post, tag_ids: Option<&[TagId]>) -> BlogResult<()> {
        let mut tables = self.tables.lock().await;
        let slot = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(BlogError::PostNotFound)?;
        *slot = post.clone();
        if let Some(tag_ids) = tag_ids {
            tables.set_tags(post.id, tag_ids)?;
        }
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> BlogResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        tables.post_tags.retain(|(p, _)| *p != id);
        tables.comments.retain(|c| c.post_id != id);
        Ok(tables.posts.len() != before)
    }
}

impl CategoryRepository for InMemoryBlogRepository {
    async fn list_categories(&self) -> BlogResult<Vec<Category>> {
        let mut categories = self.tables.lock().await.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: CategoryId) -> BlogResult<Option<Category>> {
        Ok(self
            .tables
            .lock()
            .await
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_category_by_slug(&self, slug: &Slug) -> BlogResult<Option<Category>> {
        Ok(self
            .tables
            .lock()
            .await
            .categories
            .iter()
            .find(|c| &c.slug == slug)
            .cloned())
    }

    async fn category_name_taken(&self, name: &str, except: Option<CategoryId>) -> BlogResult<bool> {
        let name = name.to_lowercase();
        Ok(self
            .tables
            .lock()
            .await
            .categories
            .iter()
            .any(|c| c.name.to_lowercase() == name && Some(c.id) != except))
    }

    async fn category_slug_taken(&self, slug: &Slug, except: Option<CategoryId>) -> BlogResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .categories
            .iter()
            .any(|c| &c.slug == slug && Some(c.id) != except))
    }

    async fn count_category_posts(&self, id: CategoryId, include_drafts: bool) -> BlogResult<u64> {
        Ok(self
            .tables
            .lock()
            .await
            .posts
            .iter()
            .filter(|p| p.category_id == Some(id) && (include_drafts || p.published))
            .count() as u64)
    }

    async fn create_category(&self, category: &NewCategory) -> BlogResult<Category> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let created = Category {
            id: CategoryId::new(tables.next_id()),
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(created.clone());
        Ok(created)
    }

    async fn update_category(&self, category: &Category) -> BlogResult<()> {
        let mut tables = self.tables.lock().await;
        let slot = tables
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or(BlogError::CategoryNotFound)?;
        *slot = category.clone();
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> BlogResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        for post in tables.posts.iter_mut().filter(|p| p.category_id == Some(id)) {
            post.category_id = None;
        }
        Ok(tables.categories.len() != before)
    }
}

impl TagRepository for InMemoryBlogRepository {
    async fn list_tags(&self) -> BlogResult<Vec<Tag>> {
        let mut tags = self.tables.lock().await.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_tag(&self, id: TagId) -> BlogResult<Option<Tag>> {
        Ok(self
            .tables
            .lock()
            .await
            .tags
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn find_tag_by_slug(&self, slug: &Slug) -> BlogResult<Option<Tag>> {
        Ok(self
            .tables
            .lock()
            .await
            .tags
            .iter()
            .find(|t| &t.slug == slug)
            .cloned())
    }

    async fn find_tags(&self, ids: &[TagId]) -> BlogResult<Vec<Tag>> {
        Ok(self
            .tables
            .lock()
            .await
            .tags
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn tag_name_taken(&self, name: &str, except: Option<TagId>) -> BlogResult<bool> {
        let name = name.to_lowercase();
        Ok(self
            .tables
            .lock()
            .await
            .tags
            .iter()
            .any(|t| t.name.to_lowercase() == name && Some(t.id) != except))
    }

    async fn tag_slug_taken(&self, slug: &Slug, except: Option<TagId>) -> BlogResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .tags
            .iter()
            .any(|t| &t.slug == slug && Some(t.id) != except))
    }

    async fn count_tag_posts(&self, id: TagId, include_drafts: bool) -> BlogResult<u64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .post_tags
            .iter()
            .filter(|(_, t)| *t == id)
            .filter(|(post_id, _)| {
                include_drafts
                    || tables
                        .posts
                        .iter()
                        .any(|p| p.id == *post_id && p.published)
            })
            .count() as u64)
    }

    async fn create_tag(&self, tag: &NewTag) -> BlogResult<Tag> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let created = Tag {
            id: TagId::new(tables.next_id()),
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.tags.push(created.clone());
        Ok(created)
    }

    async fn update_tag(&self, tag: &Tag) -> BlogResult<()> {
        let mut tables = self.tables.lock().await;
        let slot = tables
            .tags
            .iter_mut()
            .find(|t| t.id == tag.id)
            .ok_or(BlogError::TagNotFound)?;
        *slot = tag.clone();
        Ok(())
    }

    async fn delete_tag(&self, id: TagId) -> BlogResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.tags.len();
        tables.tags.retain(|t| t.id != id);
        tables.post_tags.retain(|(_, t)| *t != id);
        Ok(tables.tags.len() != before)
    }
}

impl CommentRepository for InMemoryBlogRepository {
    async fn list_comments(&self, post_id: PostId, include_unapproved: bool) -> BlogResult<Vec<Comment>> {
        let tables = self.tables.lock().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && (include_unapproved || c.approved))
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }

    async fn find_comment(&self, id: CommentId) -> BlogResult<Option<Comment>> {
        Ok(self
            .tables
            .lock()
            .await
            .comments
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create_comment(&self, comment: &NewComment) -> BlogResult<Comment> {
        let mut tables = self.tables.lock().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(BlogError::Validation("Referenced resource does not exist".to_string()));
        }
        let now = Utc::now();
        let created = Comment {
            id: CommentId::new(tables.next_id()),
            post_id: comment.post_id,
            author: comment.author.clone(),
            email: comment.email.clone(),
            content: comment.content.clone(),
            approved: comment.approved,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(created.clone());
        Ok(created)
    }

    async fn update_comment(&self, comment: &Comment) -> BlogResult<()> {
        let mut tables = self.tables.lock().await;
        let slot = tables
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or(BlogError::CommentNotFound)?;
        *slot = comment.clone();
        Ok(())
    }

    async fn delete_comment(&self, id: CommentId) -> BlogResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() != before)
    }
}

/// Keeps uploaded files in memory
#[derive(Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFileStore {
    pub async fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(file_name).cloned()
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }
}

impl FileStore for MemoryFileStore {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> BlogResult<()> {
        let mut files = self.files.lock().await;
        if files.contains_key(file_name) {
            return Err(BlogError::Conflict("A file with this name already exists".to_string()));
        }
        files.insert(file_name.to_string(), bytes.to_vec());
        Ok(())
    }
}
