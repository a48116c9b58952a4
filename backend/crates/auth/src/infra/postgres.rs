//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use sqlx::PgPool;

use crate::domain::entity::{
    password_reset::PasswordResetToken,
    user::{NewUser, User},
};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_password::UserPassword, user_role::UserRole, username::Username,
};
use crate::error::AuthResult;

const USER_COLUMNS: &str = r#"
    id,
    email,
    username,
    password_hash,
    display_name,
    bio,
    avatar,
    is_admin,
    is_verified,
    reset_password_token,
    reset_password_expires,
    password_changed_at,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Drop reset tokens that can no longer be used
    pub async fn clear_expired_reset_tokens(&self) -> AuthResult<u64> {
        let cleared = sqlx::query(
            r#"
            UPDATE users SET
                reset_password_token = NULL,
                reset_password_expires = NULL
            WHERE reset_password_expires IS NOT NULL
              AND reset_password_expires <= $1
            "#,
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(tokens_cleared = cleared, "Cleared expired password reset tokens");

        Ok(cleared)
    }
}

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                email,
                username,
                password_hash,
                display_name,
                is_admin,
                is_verified
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email.as_str())
        .bind(user.username.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.display_name.as_deref())
        .bind(user.role.is_admin())
        .bind(user.is_verified)
        .fetch_one(&self.pool)
        .await?;

        row.into_user()
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let (token_digest, token_expires) = match &user.reset_token {
            Some(token) => (Some(token.digest()), Some(token.expires_at())),
            None => (None, None),
        };

        sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                username = $3,
                password_hash = $4,
                display_name = $5,
                bio = $6,
                avatar = $7,
                is_admin = $8,
                is_verified = $9,
                reset_password_token = $10,
                reset_password_expires = $11,
                password_changed_at = $12,
                updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(user.username.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.display_name.as_deref())
        .bind(user.bio.as_deref())
        .bind(user.avatar.as_deref())
        .bind(user.role.is_admin())
        .bind(user.is_verified)
        .bind(token_digest)
        .bind(token_expires)
        .bind(user.password_changed_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_with_active_reset_tokens(&self, now: DateTime<Utc>) -> AuthResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE reset_password_token IS NOT NULL
              AND reset_password_expires > $1
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    username: String,
    password_hash: String,
    display_name: Option<String>,
    bio: Option<String>,
    avatar: Option<String>,
    is_admin: bool,
    is_verified: bool,
    reset_password_token: Option<String>,
    reset_password_expires: Option<DateTime<Utc>>,
    password_changed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let reset_token = match (self.reset_password_token, self.reset_password_expires) {
            (Some(digest), Some(expires_at)) => Some(PasswordResetToken::from_db(digest, expires_at)),
            _ => None,
        };

        Ok(User {
            id: self.id,
            email: Email::from_db(self.email),
            username: Username::from_db(self.username),
            password: UserPassword::from_phc_string(self.password_hash)?,
            display_name: self.display_name,
            bio: self.bio,
            avatar: self.avatar,
            role: UserRole::from_is_admin(self.is_admin),
            is_verified: self.is_verified,
            reset_token,
            password_changed_at: self.password_changed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
