//! Database lifecycle
//!
//! Pool creation, embedded migrations and development seeding, shared by
//! the server binary and `blogctl`.

use std::sync::Arc;

use anyhow::Context;
use auth::PgAuthRepository;
use auth::models::user_password::RawPassword;
use blog::PgBlogRepository;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../../database/migrations");

/// Dropped in dependency order by `drop_all`
pub const TABLES: [&str; 6] = ["comments", "post_tags", "posts", "tags", "categories", "users"];

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!(max_connections, "Connected to database");
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await.context("migration failed")?;
    tracing::info!("Migrations completed");
    Ok(())
}

/// Drop every application table and the migration history
pub async fn drop_all(pool: &PgPool) -> anyhow::Result<()> {
    for table in TABLES.iter().chain(std::iter::once(&"_sqlx_migrations")) {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table} CASCADE"))
            .execute(pool)
            .await
            .with_context(|| format!("failed to drop {table}"))?;
        tracing::info!(table, "Dropped table");
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatus {
    pub name: &'static str,
    /// `None` when the table does not exist
    pub rows: Option<i64>,
}

pub async fn table_status(pool: &PgPool) -> anyhow::Result<Vec<TableStatus>> {
    let mut status = Vec::with_capacity(TABLES.len());
    for name in TABLES {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(format!("public.{name}"))
            .fetch_one(pool)
            .await?;

        let rows = if exists {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {name}"))
                .fetch_one(pool)
                .await?;
            Some(count)
        } else {
            None
        };
        status.push(TableStatus { name, rows });
    }
    Ok(status)
}

/// `ADMIN_PASSWORD` when set; `None` lets seeding generate one
pub fn seed_password(configured: Option<String>) -> anyhow::Result<Option<RawPassword>> {
    configured
        .filter(|p| !p.is_empty())
        .map(|p| RawPassword::new(p).context("seed password rejected"))
        .transpose()
}

/// Seed accounts first, then sample content authored by the admin
pub async fn seed_database(pool: &PgPool, admin_password: Option<String>) -> anyhow::Result<()> {
    let password = seed_password(admin_password)?;

    let users = auth::seed::seed_users(Arc::new(PgAuthRepository::new(pool.clone())), password)
        .await
        .context("failed to seed users")?;
    if let Some(generated) = &users.generated_password {
        tracing::warn!(
            password = %generated,
            "ADMIN_PASSWORD not set, generated the password of the new seed accounts; store it now, it is not shown again"
        );
    }

    let content = blog::seed::seed_content(Arc::new(PgBlogRepository::new(pool.clone())), users.admin.id)
        .await
        .context("failed to seed blog content")?;

    tracing::info!(
        users_created = users.created,
        categories = content.categories,
        tags = content.tags,
        posts = content.posts,
        comments = content.comments,
        "Seeding completed"
    );
    Ok(())
}
