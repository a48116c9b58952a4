//! Category Use Cases
//!
//! Reads are public; writes are routed behind `require_admin`.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{CategoryId, markers};

use crate::application::validate::{optional_text, required_text, slug_or_derive};
use crate::domain::entity::category::{Category, NewCategory};
use crate::domain::repository::CategoryRepository;
use crate::domain::value_object::{id_or_slug::IdOrSlug, slug::Slug};
use crate::domain::viewer::Viewer;
use crate::error::{BlogError, BlogResult};

pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

fn description(value: Option<String>) -> BlogResult<Option<String>> {
    optional_text(value)
        .map(|d| required_text("Description", &d, MAX_DESCRIPTION_LENGTH))
        .transpose()
}

async fn ensure_unique<R>(
    repo: &R,
    name: &str,
    slug: &Slug,
    except: Option<CategoryId>,
) -> BlogResult<()>
where
    R: CategoryRepository,
{
    if repo.category_name_taken(name, except).await? {
        return Err(BlogError::Conflict("Category name already exists".to_string()));
    }
    if repo.category_slug_taken(slug, except).await? {
        return Err(BlogError::Conflict("Category slug already exists".to_string()));
    }
    Ok(())
}

pub struct ListCategoriesUseCase<R>
where
    R: CategoryRepository,
{
    repo: Arc<R>,
}

impl<R> ListCategoriesUseCase<R>
where
    R: CategoryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self) -> BlogResult<Vec<Category>> {
        self.repo.list_categories().await
    }
}

pub struct GetCategoryUseCase<R>
where
    R: CategoryRepository,
{
    repo: Arc<R>,
}

impl<R> GetCategoryUseCase<R>
where
    R: CategoryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Category named by id or slug, with its number of posts
    ///
    /// Drafts only count for admins.
    pub async fn execute(&self, id_or_slug: &str, viewer: &Viewer) -> BlogResult<(Category, u64)> {
        let lookup = IdOrSlug::<markers::Category>::parse(id_or_slug)
            .map_err(|_| BlogError::CategoryNotFound)?;

        let category = match lookup {
            IdOrSlug::Id(id) => self.repo.find_category(id).await?,
            IdOrSlug::Slug(slug) => self.repo.find_category_by_slug(&slug).await?,
        }
        .ok_or(BlogError::CategoryNotFound)?;

        let post_count = self.repo.count_category_posts(category.id, viewer.is_admin).await?;
        Ok((category, post_count))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateCategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

pub struct CreateCategoryUseCase<R>
where
    R: CategoryRepository,
{
    repo: Arc<R>,
}

impl<R> CreateCategoryUseCase<R>
where
    R: CategoryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: CreateCategoryInput) -> BlogResult<Category> {
        let name = required_text("Name", &input.name, MAX_CATEGORY_NAME_LENGTH)?;
        let slug = slug_or_derive(input.slug.as_deref(), || {
            Slug::from_text(&name, "category", Utc::now())
        })?;
        let description = description(input.description)?;

        ensure_unique(self.repo.as_ref(), &name, &slug, None).await?;

        let category = self
            .repo
            .create_category(&NewCategory {
                name,
                slug,
                description,
            })
            .await?;

        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    /// `Some(None)` clears
    pub description: Option<Option<String>>,
}

pub struct UpdateCategoryUseCase<R>
where
    R: CategoryRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateCategoryUseCase<R>
where
    R: CategoryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: CategoryId, input: UpdateCategoryInput) -> BlogResult<Category> {
        let mut category = self
            .repo
            .find_category(id)
            .await?
            .ok_or(BlogError::CategoryNotFound)?;

        if let Some(name) = input.name {
            category.name = required_text("Name", &name, MAX_CATEGORY_NAME_LENGTH)?;
        }
        if let Some(slug) = input.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            category.slug = Slug::parse(slug).map_err(|e| BlogError::Validation(e.to_string()))?;
        }
        if let Some(text) = input.description {
            category.description = description(text)?;
        }

        ensure_unique(self.repo.as_ref(), &category.name, &category.slug, Some(id)).await?;

        category.updated_at = Utc::now();
        self.repo.update_category(&category).await?;

        tracing::info!(category_id = %id, "Category updated");
        Ok(category)
    }
}

pub struct DeleteCategoryUseCase<R>
where
    R: CategoryRepository,
{
    repo: Arc<R>,
}

impl<R> DeleteCategoryUseCase<R>
where
    R: CategoryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: CategoryId) -> BlogResult<()> {
        if !self.repo.delete_category(id).await? {
            return Err(BlogError::CategoryNotFound);
        }
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
