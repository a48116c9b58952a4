//! Tag Use Cases
//!
//! Reads are public; writes are routed behind `require_admin`.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{TagId, markers};

use crate::application::validate::{required_text, slug_or_derive};
use crate::domain::entity::tag::{NewTag, Tag};
use crate::domain::repository::TagRepository;
use crate::domain::value_object::{id_or_slug::IdOrSlug, slug::Slug};
use crate::domain::viewer::Viewer;
use crate::error::{BlogError, BlogResult};

pub const MAX_TAG_NAME_LENGTH: usize = 50;

async fn ensure_unique<R>(repo: &R, name: &str, slug: &Slug, except: Option<TagId>) -> BlogResult<()>
where
    R: TagRepository,
{
    if repo.tag_name_taken(name, except).await? {
        return Err(BlogError::Conflict("Tag name already exists".to_string()));
    }
    if repo.tag_slug_taken(slug, except).await? {
        return Err(BlogError::Conflict("Tag slug already exists".to_string()));
    }
    Ok(())
}

pub struct ListTagsUseCase<R>
where
    R: TagRepository,
{
    repo: Arc<R>,
}

impl<R> ListTagsUseCase<R>
where
    R: TagRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self) -> BlogResult<Vec<Tag>> {
        self.repo.list_tags().await
    }
}

pub struct GetTagUseCase<R>
where
    R: TagRepository,
{
    repo: Arc<R>,
}

impl<R> GetTagUseCase<R>
where
    R: TagRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Tag named by id or slug, with its number of posts
    ///
    /// Drafts only count for admins.
    pub async fn execute(&self, id_or_slug: &str, viewer: &Viewer) -> BlogResult<(Tag, u64)> {
        let lookup =
            IdOrSlug::<markers::Tag>::parse(id_or_slug).map_err(|_| BlogError::TagNotFound)?;

        let tag = match lookup {
            IdOrSlug::Id(id) => self.repo.find_tag(id).await?,
            IdOrSlug::Slug(slug) => self.repo.find_tag_by_slug(&slug).await?,
        }
        .ok_or(BlogError::TagNotFound)?;

        let post_count = self.repo.count_tag_posts(tag.id, viewer.is_admin).await?;
        Ok((tag, post_count))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateTagInput {
    pub name: String,
    pub slug: Option<String>,
}

pub struct CreateTagUseCase<R>
where
    R: TagRepository,
{
    repo: Arc<R>,
}

impl<R> CreateTagUseCase<R>
where
    R: TagRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: CreateTagInput) -> BlogResult<Tag> {
        let name = required_text("Name", &input.name, MAX_TAG_NAME_LENGTH)?;
        let slug = slug_or_derive(input.slug.as_deref(), || {
            Slug::from_text(&name, "tag", Utc::now())
        })?;

        ensure_unique(self.repo.as_ref(), &name, &slug, None).await?;

        let tag = self.repo.create_tag(&NewTag { name, slug }).await?;

        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "Tag created");
        Ok(tag)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTagInput {
    pub name: Option<String>,
    pub slug: Option<String>,
}

pub struct UpdateTagUseCase<R>
where
    R: TagRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateTagUseCase<R>
where
    R: TagRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: TagId, input: UpdateTagInput) -> BlogResult<Tag> {
        let mut tag = self.repo.find_tag(id).await?.ok_or(BlogError::TagNotFound)?;

        if let Some(name) = input.name {
            tag.name = required_text("Name", &name, MAX_TAG_NAME_LENGTH)?;
        }
        if let Some(slug) = input.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            tag.slug = Slug::parse(slug).map_err(|e| BlogError::Validation(e.to_string()))?;
        }

        ensure_unique(self.repo.as_ref(), &tag.name, &tag.slug, Some(id)).await?;

        tag.updated_at = Utc::now();
        self.repo.update_tag(&tag).await?;

        tracing::info!(tag_id = %id, "Tag updated");
        Ok(tag)
    }
}

pub struct DeleteTagUseCase<R>
where
    R: TagRepository,
{
    repo: Arc<R>,
}

impl<R> DeleteTagUseCase<R>
where
    R: TagRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Posts lose the tag; they are not deleted
    pub async fn execute(&self, id: TagId) -> BlogResult<()> {
        if !self.repo.delete_tag(id).await? {
            return Err(BlogError::TagNotFound);
        }
        tracing::info!(tag_id = %id, "Tag deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::post::{CreatePostInput, CreatePostUseCase};
    use crate::testing::InMemoryBlogRepository;

    fn input(name: &str) -> CreateTagInput {
        CreateTagInput {
            name: name.to_string(),
            slug: None,
        }
    }

    #[tokio::test]
    async fn test_tag_lifecycle() {
        let repo = Arc::new(InMemoryBlogRepository::default());
        let author = repo.add_author(1, "alice").await;

        let create = CreateTagUseCase::new(repo.clone());
        let ts = create.execute(input("TypeScript")).await.unwrap();
        assert_eq!(ts.slug.as_str(), "typescript");

        let err = create.execute(input("typescript")).await.unwrap_err();
        assert!(matches!(err, BlogError::Conflict(_)));

        CreatePostUseCase::new(repo.clone())
            .execute(
                author,
                CreatePostInput {
                    title: "Typed".to_string(),
                    content: "Body".to_string(),
                    published: true,
                    tag_ids: vec![ts.id],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        CreatePostUseCase::new(repo.clone())
            .execute(
                author,
                CreatePostInput {
                    title: "Typed draft".to_string(),
                    content: "Body".to_string(),
                    published: false,
                    tag_ids: vec![ts.id],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let get = GetTagUseCase::new(repo.clone());
        let (tag, count) = get.execute("typescript", &Viewer::anonymous()).await.unwrap();
        assert_eq!(tag.id, ts.id);
        assert_eq!(count, 1);

        let admin = Viewer::user(kernel::id::UserId::new(99), true);
        let (_, count) = get.execute("typescript", &admin).await.unwrap();
        assert_eq!(count, 2);

        let renamed = UpdateTagUseCase::new(repo.clone())
            .execute(
                ts.id,
                UpdateTagInput {
                    name: Some("TS".to_string()),
                    slug: Some("ts".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.slug.as_str(), "ts");

        DeleteTagUseCase::new(repo.clone()).execute(ts.id).await.unwrap();
        assert!(ListTagsUseCase::new(repo.clone()).execute().await.unwrap().is_empty());
        // The posts survive without the tag
        assert_eq!(repo.post_count().await, 2);
    }

    #[tokio::test]
    async fn test_non_ascii_name_gets_fallback_slug() {
        let repo = Arc::new(InMemoryBlogRepository::default());
        let tag = CreateTagUseCase::new(repo)
            .execute(input("技術"))
            .await
            .unwrap();
        assert!(tag.slug.as_str().starts_with("tag-"));
    }
}
