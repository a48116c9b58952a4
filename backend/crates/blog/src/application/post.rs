//! Post Use Cases
//!
//! Listing, lookup by id or slug, create, update and delete. Drafts behave
//! as missing for anyone but their author and admins.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{CategoryId, PostId, TagId, UserId};
use kernel::pagination::PageRequest;
use kernel::response::Pagination;

use crate::application::validate::{optional_text, required_text, slug_or_derive};
use crate::domain::entity::post::{
    NewPost, PostDetails, PostFilter, excerpt_from_content, normalize_tag_ids,
};
use crate::domain::repository::{CategoryRepository, PostRepository, TagRepository};
use crate::domain::value_object::slug::{MAX_SLUG_LENGTH, Slug};
use crate::domain::viewer::Viewer;
use crate::error::{BlogError, BlogResult};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_EXCERPT_LENGTH: usize = 500;
pub const MAX_IMAGE_URL_LENGTH: usize = 500;

/// Attempts at `-2`, `-3`, ... before a derived slug is reported as taken
const MAX_SLUG_SUFFIX: u32 = 100;

/// Derived slugs get a numeric suffix when taken; explicit ones conflict
async fn resolve_post_slug<R>(
    repo: &R,
    explicit: Option<&str>,
    title: &str,
    except: Option<PostId>,
) -> BlogResult<Slug>
where
    R: PostRepository,
{
    let explicit_given = explicit.is_some_and(|s| !s.trim().is_empty());
    let base = slug_or_derive(explicit, || Slug::from_title(title, Utc::now()))?;

    if !repo.post_slug_taken(&base, except).await? {
        return Ok(base);
    }
    if explicit_given {
        return Err(BlogError::Conflict("Slug already exists".to_string()));
    }

    for n in 2..=MAX_SLUG_SUFFIX {
        let suffix = format!("-{n}");
        let stem = &base.as_str()[..base.as_str().len().min(MAX_SLUG_LENGTH - suffix.len())];
        let candidate = Slug::from_db(format!("{}{}", stem.trim_end_matches('-'), suffix));
        if !repo.post_slug_taken(&candidate, except).await? {
            return Ok(candidate);
        }
    }
    Err(BlogError::Conflict("Slug already exists".to_string()))
}

async fn ensure_category<R>(repo: &R, category_id: Option<CategoryId>) -> BlogResult<()>
where
    R: CategoryRepository,
{
    if let Some(id) = category_id {
        if repo.find_category(id).await?.is_none() {
            return Err(BlogError::Validation("Category does not exist".to_string()));
        }
    }
    Ok(())
}

/// Deduplicated ids, all of which exist
async fn ensure_tags<R>(repo: &R, tag_ids: &[TagId]) -> BlogResult<Vec<TagId>>
where
    R: TagRepository,
{
    let ids = normalize_tag_ids(tag_ids);
    if ids.is_empty() {
        return Ok(ids);
    }

    let found = repo.find_tags(&ids).await?;
    if found.len() != ids.len() {
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !found.iter().any(|t| t.id == **id))
            .map(|id| id.to_string())
            .collect();
        return Err(BlogError::Validation(format!(
            "Tag does not exist: {}",
            missing.join(", ")
        )));
    }
    Ok(ids)
}

fn image_url(value: Option<String>) -> BlogResult<Option<String>> {
    let value = optional_text(value);
    if let Some(url) = &value {
        if url.chars().count() > MAX_IMAGE_URL_LENGTH {
            return Err(BlogError::Validation(format!(
                "Image URL must be at most {MAX_IMAGE_URL_LENGTH} characters"
            )));
        }
    }
    Ok(value)
}

fn excerpt_or_derive(excerpt: Option<String>, content: &str) -> BlogResult<String> {
    match optional_text(excerpt) {
        Some(excerpt) => required_text("Excerpt", &excerpt, MAX_EXCERPT_LENGTH),
        None => Ok(excerpt_from_content(content)),
    }
}

// ============================================================================
// List
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ListPostsQuery {
    pub page: PageRequest,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    /// Honoured for admins only
    pub include_drafts: bool,
}

pub struct ListPostsUseCase<R>
where
    R: PostRepository,
{
    repo: Arc<R>,
}

impl<R> ListPostsUseCase<R>
where
    R: PostRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        query: ListPostsQuery,
        viewer: &Viewer,
    ) -> BlogResult<(Vec<PostDetails>, Pagination)> {
        let filter = PostFilter {
            include_drafts: query.include_drafts && viewer.is_admin,
            category_slug: optional_text(query.category),
            tag_slug: optional_text(query.tag),
            search: optional_text(query.search),
        };

        let (posts, total) = self.repo.list_posts(&filter, query.page).await?;
        Ok((posts, Pagination::new(query.page, total)))
    }
}

// ============================================================================
// Get
// ============================================================================

pub struct GetPostUseCase<R>
where
    R: PostRepository,
{
    repo: Arc<R>,
}

impl<R> GetPostUseCase<R>
where
    R: PostRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn by_id(&self, id: PostId, viewer: &Viewer) -> BlogResult<PostDetails> {
        let details = self.repo.find_post(id).await?;
        visible(details, viewer)
    }

    pub async fn by_slug(&self, slug: &str, viewer: &Viewer) -> BlogResult<PostDetails> {
        // A malformed slug cannot match anything
        let slug = Slug::parse(slug).map_err(|_| BlogError::PostNotFound)?;
        let details = self.repo.find_post_by_slug(&slug).await?;
        visible(details, viewer)
    }
}

fn visible(details: Option<PostDetails>, viewer: &Viewer) -> BlogResult<PostDetails> {
    details
        .filter(|d| d.post.is_visible_to(viewer))
        .ok_or(BlogError::PostNotFound)
}

// ============================================================================
// Create
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CreatePostInput {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub published: bool,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Vec<TagId>,
}

pub struct CreatePostUseCase<R>
where
    R: PostRepository + CategoryRepository + TagRepository,
{
    repo: Arc<R>,
}

impl<R> CreatePostUseCase<R>
where
    R: PostRepository + CategoryRepository + TagRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, author_id: UserId, input: CreatePostInput) -> BlogResult<PostDetails> {
        let title = required_text("Title", &input.title, MAX_TITLE_LENGTH)?;
        if input.content.trim().is_empty() {
            return Err(BlogError::Validation("Content is required".to_string()));
        }
        let excerpt = excerpt_or_derive(input.excerpt, &input.content)?;
        let image_url = image_url(input.image_url)?;

        ensure_category(self.repo.as_ref(), input.category_id).await?;
        let tag_ids = ensure_tags(self.repo.as_ref(), &input.tag_ids).await?;
        let slug = resolve_post_slug(self.repo.as_ref(), input.slug.as_deref(), &title, None).await?;

        let id = self
            .repo
            .create_post(
                &NewPost {
                    title,
                    slug,
                    content: input.content,
                    excerpt,
                    image_url,
                    published: input.published,
                    author_id,
                    category_id: input.category_id,
                },
                &tag_ids,
            )
            .await?;

        tracing::info!(post_id = %id, author_id = %author_id, "Post created");

        self.repo.find_post(id).await?.ok_or(BlogError::PostNotFound)
    }
}

// ============================================================================
// Update
// ============================================================================

/// Every `None` leaves the field as it is
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    /// Blank re-derives from the content
    pub excerpt: Option<String>,
    /// `Some(None)` clears
    pub image_url: Option<Option<String>>,
    pub published: Option<bool>,
    /// `Some(None)` clears
    pub category_id: Option<Option<CategoryId>>,
    /// Replaces the whole set
    pub tag_ids: Option<Vec<TagId>>,
}

pub struct UpdatePostUseCase<R>
where
    R: PostRepository + CategoryRepository + TagRepository,
{
    repo: Arc<R>,
}

impl<R> UpdatePostUseCase<R>
where
    R: PostRepository + CategoryRepository + TagRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        id: PostId,
        viewer: &Viewer,
        input: UpdatePostInput,
    ) -> BlogResult<PostDetails> {
        let details = self.repo.find_post(id).await?;
        let mut post = visible(details, viewer)?.post;
        if !post.can_be_modified_by(viewer) {
            return Err(BlogError::NotAuthor);
        }

        if let Some(title) = input.title {
            post.title = required_text("Title", &title, MAX_TITLE_LENGTH)?;
        }
        if let Some(content) = input.content {
            if content.trim().is_empty() {
                return Err(BlogError::Validation("Content is required".to_string()));
            }
            post.content = content;
        }
        if let Some(excerpt) = input.excerpt {
            post.excerpt = excerpt_or_derive(Some(excerpt), &post.content)?;
        }
        if let Some(url) = input.image_url {
            post.image_url = image_url(url)?;
        }
        if let Some(published) = input.published {
            post.published = published;
        }
        if let Some(category_id) = input.category_id {
            ensure_category(self.repo.as_ref(), category_id).await?;
            post.category_id = category_id;
        }
        if let Some(slug) = input.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            post.slug =
                resolve_post_slug(self.repo.as_ref(), Some(slug), &post.title, Some(post.id)).await?;
        }
        let tag_ids = match &input.tag_ids {
            Some(ids) => Some(ensure_tags(self.repo.as_ref(), ids).await?),
            None => None,
        };

        post.updated_at = Utc::now();
        self.repo.update_post(&post, tag_ids.as_deref()).await?;

        tracing::info!(post_id = %post.id, "Post updated");

        self.repo.find_post(id).await?.ok_or(BlogError::PostNotFound)
    }
}

// ============================================================================
// Delete
// ============================================================================

pub struct DeletePostUseCase<R>
where
    R: PostRepository,
{
    repo: Arc<R>,
}

impl<R> DeletePostUseCase<R>
where
    R: PostRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: PostId, viewer: &Viewer) -> BlogResult<()> {
        let details = self.repo.find_post(id).await?;
        let post = visible(details, viewer)?.post;
        if !post.can_be_modified_by(viewer) {
            return Err(BlogError::NotAuthor);
        }

        if !self.repo.delete_post(id).await? {
            return Err(BlogError::PostNotFound);
        }

        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::tag::NewTag;
    use crate::domain::entity::category::NewCategory;
    use crate::testing::InMemoryBlogRepository;

    const ALICE: i64 = 1;
    const BOB: i64 = 2;

    async fn repo() -> Arc<InMemoryBlogRepository> {
        let repo = Arc::new(InMemoryBlogRepository::default());
        repo.add_author(ALICE, "alice").await;
        repo.add_author(BOB, "bob").await;
        repo
    }

    fn alice() -> Viewer {
        Viewer::user(UserId::new(ALICE), false)
    }

    fn bob() -> Viewer {
        Viewer::user(UserId::new(BOB), false)
    }

    fn admin() -> Viewer {
        Viewer::user(UserId::new(99), true)
    }

    fn input(title: &str, published: bool) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            content: format!("Content of {title}"),
            published,
            ..Default::default()
        }
    }

    async fn create(repo: &Arc<InMemoryBlogRepository>, input: CreatePostInput) -> BlogResult<PostDetails> {
        CreatePostUseCase::new(repo.clone())
            .execute(UserId::new(ALICE), input)
            .await
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_excerpt() {
        let repo = repo().await;
        let details = create(&repo, input("Hello Rust World", true)).await.unwrap();

        assert_eq!(details.post.slug.as_str(), "hello-rust-world");
        assert_eq!(details.post.excerpt, "Content of Hello Rust World");
        assert_eq!(details.author.username, "alice");
        assert!(details.category.is_none());
        assert!(details.tags.is_empty());
    }

    #[tokio::test]
    async fn test_create_slug_conflicts() {
        let repo = repo().await;
        create(&repo, input("Same Title", true)).await.unwrap();

        // Derived slugs get a suffix
        let second = create(&repo, input("Same Title", true)).await.unwrap();
        assert_eq!(second.post.slug.as_str(), "same-title-2");

        // Explicit slugs conflict
        let err = create(
            &repo,
            CreatePostInput {
                slug: Some("same-title".to_string()),
                ..input("Other", true)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BlogError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let repo = repo().await;

        let err = create(&repo, input("  ", true)).await.unwrap_err();
        assert!(matches!(err, BlogError::Validation(ref m) if m == "Title is required"));

        let err = create(&repo, input(&"x".repeat(201), true)).await.unwrap_err();
        assert!(matches!(err, BlogError::Validation(_)));

        let err = create(
            &repo,
            CreatePostInput {
                content: " ".to_string(),
                ..input("Title", true)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BlogError::Validation(ref m) if m == "Content is required"));

        let err = create(
            &repo,
            CreatePostInput {
                slug: Some("Bad Slug".to_string()),
                ..input("Title", true)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BlogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_checks_category_and_tags() {
        let repo = repo().await;

        let err = create(
            &repo,
            CreatePostInput {
                category_id: Some(CategoryId::new(404)),
                ..input("Title", true)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BlogError::Validation(ref m) if m == "Category does not exist"));

        let go = repo
            .create_tag(&NewTag {
                name: "Go".to_string(),
                slug: Slug::from_db("go"),
            })
            .await
            .unwrap();
        let err = create(
            &repo,
            CreatePostInput {
                tag_ids: vec![go.id, TagId::new(404)],
                ..input("Title", true)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BlogError::Validation(ref m) if m.contains("404")));

        let details = create(
            &repo,
            CreatePostInput {
                tag_ids: vec![go.id, go.id],
                ..input("Title", true)
            },
        )
        .await
        .unwrap();
        assert_eq!(details.tags.len(), 1);
    }

    #[tokio::test]
    async fn test_drafts_are_hidden() {
        let repo = repo().await;
        let draft = create(&repo, input("Draft", false)).await.unwrap();
        let get = GetPostUseCase::new(repo.clone());

        assert!(matches!(
            get.by_id(draft.post.id, &Viewer::anonymous()).await,
            Err(BlogError::PostNotFound)
        ));
        assert!(matches!(
            get.by_slug("draft", &bob()).await,
            Err(BlogError::PostNotFound)
        ));
        assert!(get.by_id(draft.post.id, &alice()).await.is_ok());
        assert!(get.by_slug("draft", &admin()).await.is_ok());
        assert!(matches!(
            get.by_slug("Not A Slug", &admin()).await,
            Err(BlogError::PostNotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let repo = repo().await;
        let tech = repo
            .create_category(&NewCategory {
                name: "Technology".to_string(),
                slug: Slug::from_db("technology"),
                description: None,
            })
            .await
            .unwrap();
        let rust = repo
            .create_tag(&NewTag {
                name: "Rust".to_string(),
                slug: Slug::from_db("rust"),
            })
            .await
            .unwrap();

        for i in 0..3 {
            create(&repo, input(&format!("Plain {i}"), true)).await.unwrap();
        }
        create(
            &repo,
            CreatePostInput {
                category_id: Some(tech.id),
                tag_ids: vec![rust.id],
                ..input("Ownership explained", true)
            },
        )
        .await
        .unwrap();
        create(&repo, input("Secret draft", false)).await.unwrap();

        let list = ListPostsUseCase::new(repo.clone());

        let (posts, pagination) = list
            .execute(ListPostsQuery::default(), &Viewer::anonymous())
            .await
            .unwrap();
        assert_eq!(posts.len(), 4);
        assert_eq!(pagination.total, 4);
        assert_eq!(posts[0].post.title, "Ownership explained");

        let (posts, _) = list
            .execute(
                ListPostsQuery {
                    include_drafts: true,
                    ..Default::default()
                },
                &Viewer::anonymous(),
            )
            .await
            .unwrap();
        assert_eq!(posts.len(), 4);

        let (posts, _) = list
            .execute(
                ListPostsQuery {
                    include_drafts: true,
                    ..Default::default()
                },
                &admin(),
            )
            .await
            .unwrap();
        assert_eq!(posts.len(), 5);

        let (posts, _) = list
            .execute(
                ListPostsQuery {
                    category: Some("technology".to_string()),
                    ..Default::default()
                },
                &Viewer::anonymous(),
            )
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);

        let (posts, _) = list
            .execute(
                ListPostsQuery {
                    tag: Some("rust".to_string()),
                    ..Default::default()
                },
                &Viewer::anonymous(),
            )
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].tags[0].name, "Rust");

        let (posts, _) = list
            .execute(
                ListPostsQuery {
                    search: Some("OWNERSHIP".to_string()),
                    ..Default::default()
                },
                &Viewer::anonymous(),
            )
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);

        let (posts, pagination) = list
            .execute(
                ListPostsQuery {
                    page: PageRequest::new(Some(2), Some(3)),
                    ..Default::default()
                },
                &Viewer::anonymous(),
            )
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn test_update_permissions_and_fields() {
        let repo = repo().await;
        let post = create(&repo, input("Original", true)).await.unwrap().post;
        let update = UpdatePostUseCase::new(repo.clone());

        let err = update
            .execute(post.id, &bob(), UpdatePostInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::NotAuthor));

        let updated = update
            .execute(
                post.id,
                &alice(),
                UpdatePostInput {
                    title: Some("Renamed".to_string()),
                    slug: Some("renamed".to_string()),
                    published: Some(false),
                    image_url: Some(Some("/uploads/1_a.png".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.post.title, "Renamed");
        assert_eq!(updated.post.slug.as_str(), "renamed");
        assert!(!updated.post.published);
        assert_eq!(updated.post.image_url.as_deref(), Some("/uploads/1_a.png"));

        // Admins may edit anyone's post
        let updated = update
            .execute(
                post.id,
                &admin(),
                UpdatePostInput {
                    image_url: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.post.image_url.is_none());
        assert_eq!(updated.post.title, "Renamed");
    }

    #[tokio::test]
    async fn test_update_replaces_tags() {
        let repo = repo().await;
        let mut tag_ids = Vec::new();
        for name in ["a", "b", "c"] {
            let tag = repo
                .create_tag(&NewTag {
                    name: name.to_string(),
                    slug: Slug::from_db(name),
                })
                .await
                .unwrap();
            tag_ids.push(tag.id);
        }
        let post = create(
            &repo,
            CreatePostInput {
                tag_ids: tag_ids[..2].to_vec(),
                ..input("Tagged", true)
            },
        )
        .await
        .unwrap()
        .post;

        let updated = UpdatePostUseCase::new(repo.clone())
            .execute(
                post.id,
                &alice(),
                UpdatePostInput {
                    tag_ids: Some(vec![tag_ids[2]]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let names: Vec<_> = updated.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["c"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let post = create(&repo, input("Doomed", true)).await.unwrap().post;
        let delete = DeletePostUseCase::new(repo.clone());

        assert!(matches!(
            delete.execute(post.id, &bob()).await,
            Err(BlogError::NotAuthor)
        ));
        delete.execute(post.id, &alice()).await.unwrap();
        assert_eq!(repo.post_count().await, 0);
        assert!(matches!(
            delete.execute(post.id, &alice()).await,
            Err(BlogError::PostNotFound)
        ));
    }
}
