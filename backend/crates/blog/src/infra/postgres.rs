//! PostgreSQL Repository Implementation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, CommentId, PostId, TagId, UserId};
use kernel::pagination::PageRequest;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::entity::{
    category::{Category, NewCategory},
    comment::{Comment, NewComment},
    post::{AuthorSummary, NewPost, Post, PostDetails, PostFilter},
    tag::{NewTag, Tag},
};
use crate::domain::repository::{
    CategoryRepository, CommentRepository, PostRepository, TagRepository,
};
use crate::domain::value_object::slug::Slug;
use crate::error::BlogResult;

const POST_SELECT: &str = r#"
    SELECT
        p.id,
        p.title,
        p.slug,
        p.content,
        p.excerpt,
        p.image_url,
        p.published,
        p.author_id,
        p.category_id,
        p.created_at,
        p.updated_at,
        u.username AS author_username,
        u.display_name AS author_display_name,
        c.name AS category_name,
        c.slug AS category_slug,
        c.description AS category_description,
        c.created_at AS category_created_at,
        c.updated_at AS category_updated_at
"#;

const POST_FROM: &str = r#"
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

const CATEGORY_COLUMNS: &str = "id, name, slug, description, created_at, updated_at";
const TAG_COLUMNS: &str = "id, name, slug, created_at, updated_at";
const COMMENT_COLUMNS: &str =
    "id, post_id, author, email, content, approved, created_at, updated_at";

/// `%term%` for ILIKE with `\`, `%` and `_` taken literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn push_post_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    builder.push(" WHERE TRUE");

    if !filter.include_drafts {
        builder.push(" AND p.published = TRUE");
    }
    if let Some(slug) = &filter.category_slug {
        builder.push(" AND c.slug = ").push_bind(slug.clone());
    }
    if let Some(slug) = &filter.tag_slug {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
                 WHERE pt.post_id = p.id AND t.slug = ",
            )
            .push_bind(slug.clone())
            .push(")");
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.content ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.excerpt ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// PostgreSQL-backed repository for every blog resource
#[derive(Clone)]
pub struct PgBlogRepository {
    pool: PgPool,
}

impl PgBlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tags of every post in `post_ids`, one query for the whole page
    async fn tags_for_posts(&self, post_ids: &[PostId]) -> BlogResult<HashMap<PostId, Vec<Tag>>> {
        let mut by_post: HashMap<PostId, Vec<Tag>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(by_post);
        }

        let ids: Vec<i64> = post_ids.iter().map(|id| id.get()).collect();
        let rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.id, t.name, t.slug, t.created_at, t.updated_at
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            by_post.entry(row.post_id).or_default().push(row.into_tag());
        }
        Ok(by_post)
    }

    async fn with_tags(&self, rows: Vec<PostRow>) -> BlogResult<Vec<PostDetails>> {
        let ids: Vec<PostId> = rows.iter().map(|r| r.id).collect();
        let mut tags = self.tags_for_posts(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let post_tags = tags.remove(&row.id).unwrap_or_default();
                row.into_details(post_tags)
            })
            .collect())
    }

    async fn find_post_where(&self, column: &str, value: PostLookup<'_>) -> BlogResult<Option<PostDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(POST_SELECT);
        builder.push(POST_FROM).push(" WHERE p.").push(column).push(" = ");
        match value {
            PostLookup::Id(id) => builder.push_bind(id),
            PostLookup::Slug(slug) => builder.push_bind(slug.as_str().to_string()),
        };

        let row = builder
            .build_query_as::<PostRow>()
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.with_tags(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

enum PostLookup<'a> {
    Id(PostId),
    Slug(&'a Slug),
}

impl PostRepository for PgBlogRepository {
    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> BlogResult<(Vec<PostDetails>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count.push(POST_FROM);
        push_post_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(POST_SELECT);
        select.push(POST_FROM);
        push_post_filter(&mut select, filter);
        select
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = select
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await?;

        let posts = self.with_tags(rows).await?;
        Ok((posts, total.max(0) as u64))
    }

    async fn find_post(&self, id: PostId) -> BlogResult<Option<PostDetails>> {
        self.find_post_where("id", PostLookup::Id(id)).await
    }

    async fn find_post_by_slug(&self, slug: &Slug) -> BlogResult<Option<PostDetails>> {
        self.find_post_where("slug", PostLookup::Slug(slug)).await
    }

    async fn post_slug_taken(&self, slug: &Slug, except: Option<PostId>) -> BlogResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug.as_str())
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn create_post(&self, post: &NewPost, tag_ids: &[TagId]) -> BlogResult<PostId> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, PostId>(
            r#"
            INSERT INTO posts (
                title,
                slug,
                content,
                excerpt,
                image_url,
                published,
                author_id,
                category_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&post.title)
        .bind(post.slug.as_str())
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(post.image_url.as_deref())
        .bind(post.published)
        .bind(post.author_id)
        .bind(post.category_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_post_tags(&mut tx, id, tag_ids).await?;
        tx.commit().await?;

        Ok(id)
    }

    async fn update_post(&self, post: &Post, tag_ids: Option<&[TagId]>) -> BlogResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE posts SET
                title = $2,
                slug = $3,
                content = $4,
                excerpt = $5,
                image_url = $6,
                published = $7,
                category_id = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(post.slug.as_str())
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(post.image_url.as_deref())
        .bind(post.published)
        .bind(post.category_id)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await?;

        if let Some(tag_ids) = tag_ids {
            replace_post_tags(&mut tx, post.id, tag_ids).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> BlogResult<bool> {
        // post_tags and comments cascade
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

async fn replace_post_tags(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    post_id: PostId,
    tag_ids: &[TagId],
) -> BlogResult<()> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut **tx)
        .await?;

    if !tag_ids.is_empty() {
        let ids: Vec<i64> = tag_ids.iter().map(|id| id.get()).collect();
        sqlx::query("INSERT INTO post_tags (post_id, tag_id) SELECT $1, UNNEST($2::BIGINT[])")
            .bind(post_id)
            .bind(ids)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

impl CategoryRepository for PgBlogRepository {
    async fn list_categories(&self) -> BlogResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn find_category(&self, id: CategoryId) -> BlogResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CategoryRow::into_category))
    }

    async fn find_category_by_slug(&self, slug: &Slug) -> BlogResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CategoryRow::into_category))
    }

    async fn category_name_taken(&self, name: &str, except: Option<CategoryId>) -> BlogResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM categories
                WHERE LOWER(name) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn category_slug_taken(&self, slug: &Slug, except: Option<CategoryId>) -> BlogResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug.as_str())
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn count_category_posts(&self, id: CategoryId, include_drafts: bool) -> BlogResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM posts WHERE category_id = $1 AND ($2 OR published = TRUE)",
        )
        .bind(id)
        .bind(include_drafts)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn create_category(&self, category: &NewCategory) -> BlogResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r#"
            INSERT INTO categories (name, slug, description)
            VALUES ($1, $2, $3)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&category.name)
        .bind(category.slug.as_str())
        .bind(category.description.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_category())
    }

    async fn update_category(&self, category: &Category) -> BlogResult<()> {
        sqlx::query(
            r#"
            UPDATE categories SET
                name = $2,
                slug = $3,
                description = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(category.slug.as_str())
        .bind(category.description.as_deref())
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> BlogResult<bool> {
        // posts.category_id is ON DELETE SET NULL
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

impl TagRepository for PgBlogRepository {
    async fn list_tags(&self) -> BlogResult<Vec<Tag>> {
        let rows = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TagRow::into_tag).collect())
    }

    async fn find_tag(&self, id: TagId) -> BlogResult<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TagRow::into_tag))
    }

    async fn find_tag_by_slug(&self, slug: &Slug) -> BlogResult<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TagRow::into_tag))
    }

    async fn find_tags(&self, ids: &[TagId]) -> BlogResult<Vec<Tag>> {
        let ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE id = ANY($1) ORDER BY name"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TagRow::into_tag).collect())
    }

    async fn tag_name_taken(&self, name: &str, except: Option<TagId>) -> BlogResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM tags
                WHERE LOWER(name) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn tag_slug_taken(&self, slug: &Slug, except: Option<TagId>) -> BlogResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tags WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug.as_str())
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn count_tag_posts(&self, id: TagId, include_drafts: bool) -> BlogResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM post_tags pt
            JOIN posts p ON p.id = pt.post_id
            WHERE pt.tag_id = $1 AND ($2 OR p.published = TRUE)
            "#,
        )
        .bind(id)
        .bind(include_drafts)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn create_tag(&self, tag: &NewTag) -> BlogResult<Tag> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            "INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING {TAG_COLUMNS}"
        ))
        .bind(&tag.name)
        .bind(tag.slug.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_tag())
    }

    async fn update_tag(&self, tag: &Tag) -> BlogResult<()> {
        sqlx::query("UPDATE tags SET name = $2, slug = $3, updated_at = $4 WHERE id = $1")
            .bind(tag.id)
            .bind(&tag.name)
            .bind(tag.slug.as_str())
            .bind(tag.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_tag(&self, id: TagId) -> BlogResult<bool> {
        let deleted = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

impl CommentRepository for PgBlogRepository {
    async fn list_comments(&self, post_id: PostId, include_unapproved: bool) -> BlogResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE post_id = $1 AND ($2 OR approved)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(post_id)
        .bind(include_unapproved)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn find_comment(&self, id: CommentId) -> BlogResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    async fn create_comment(&self, comment: &NewComment) -> BlogResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            INSERT INTO comments (post_id, author, email, content, approved)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(comment.post_id)
        .bind(&comment.author)
        .bind(&comment.email)
        .bind(&comment.content)
        .bind(comment.approved)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_comment(&self, comment: &Comment) -> BlogResult<()> {
        sqlx::query("UPDATE comments SET content = $2, approved = $3, updated_at = $4 WHERE id = $1")
            .bind(comment.id)
            .bind(&comment.content)
            .bind(comment.approved)
            .bind(comment.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_comment(&self, id: CommentId) -> BlogResult<bool> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct PostRow {
    id: PostId,
    title: String,
    slug: String,
    content: String,
    excerpt: String,
    image_url: Option<String>,
    published: bool,
    author_id: UserId,
    category_id: Option<CategoryId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_username: String,
    author_display_name: Option<String>,
    category_name: Option<String>,
    category_slug: Option<String>,
    category_description: Option<String>,
    category_created_at: Option<DateTime<Utc>>,
    category_updated_at: Option<DateTime<Utc>>,
}

impl PostRow {
    fn into_details(self, tags: Vec<Tag>) -> PostDetails {
        let category = match (
            self.category_id,
            self.category_name,
            self.category_slug,
            self.category_created_at,
            self.category_updated_at,
        ) {
            (Some(id), Some(name), Some(slug), Some(created_at), Some(updated_at)) => {
                Some(Category {
                    id,
                    name,
                    slug: Slug::from_db(slug),
                    description: self.category_description,
                    created_at,
                    updated_at,
                })
            }
            _ => None,
        };

        PostDetails {
            author: AuthorSummary {
                id: self.author_id,
                username: self.author_username,
                display_name: self.author_display_name,
            },
            category,
            tags,
            post: Post {
                id: self.id,
                title: self.title,
                slug: Slug::from_db(self.slug),
                content: self.content,
                excerpt: self.excerpt,
                image_url: self.image_url,
                published: self.published,
                author_id: self.author_id,
                category_id: self.category_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    slug: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
            slug: Slug::from_db(self.slug),
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: TagId,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TagRow {
    fn into_tag(self) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
            slug: Slug::from_db(self.slug),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: PostId,
    id: TagId,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostTagRow {
    fn into_tag(self) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
            slug: Slug::from_db(self.slug),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: CommentId,
    post_id: PostId,
    author: String,
    email: String,
    content: String,
    approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author: row.author,
            email: row.email,
            content: row.content,
            approved: row.approved,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
