//! Development seed accounts
//!
//! `admin@example.com` (admin, verified) and `user@example.com`. Existing
//! accounts are left untouched, so seeding twice is harmless.

use std::sync::Arc;

use platform::password::generate_password;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
    username::Username,
};
use crate::error::{AuthError, AuthResult};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_USERNAME: &str = "admin";
pub const USER_EMAIL: &str = "user@example.com";
pub const USER_USERNAME: &str = "testuser";

/// Length and digit count of a generated seed password
pub const GENERATED_PASSWORD_LENGTH: usize = 16;
pub const GENERATED_PASSWORD_DIGITS: usize = 4;

#[derive(Debug)]
pub struct SeededUsers {
    pub admin: User,
    pub user: User,
    /// Accounts created by this run
    pub created: usize,
    /// Set only when this run generated the password of the created accounts
    pub generated_password: Option<String>,
}

struct SeedAccount {
    email: &'static str,
    username: &'static str,
    display_name: &'static str,
    role: UserRole,
    is_verified: bool,
}

const ADMIN_ACCOUNT: SeedAccount = SeedAccount {
    email: ADMIN_EMAIL,
    username: ADMIN_USERNAME,
    display_name: "Administrator",
    role: UserRole::Admin,
    is_verified: true,
};

const USER_ACCOUNT: SeedAccount = SeedAccount {
    email: USER_EMAIL,
    username: USER_USERNAME,
    display_name: "Test User",
    role: UserRole::User,
    is_verified: true,
};

async fn find_user<R>(repo: &R, account: &SeedAccount) -> AuthResult<Option<User>>
where
    R: UserRepository,
{
    let existing = repo.find_by_email(&Email::new(account.email)?).await?;
    if existing.is_some() {
        tracing::debug!(email = account.email, "Seed user already exists");
    }
    Ok(existing)
}

async fn create_user<R>(repo: &R, account: &SeedAccount, password: &UserPassword) -> AuthResult<User>
where
    R: UserRepository,
{
    let username =
        Username::new(account.username).map_err(|e| AuthError::Internal(e.to_string()))?;
    let user = repo
        .create(&NewUser {
            email: Email::new(account.email)?,
            username,
            password: password.clone(),
            display_name: Some(account.display_name.to_string()),
            role: account.role,
            is_verified: account.is_verified,
        })
        .await?;

    tracing::info!(user_id = %user.id, email = account.email, "Seed user created");
    Ok(user)
}

async fn ensure_user<R>(
    repo: &R,
    existing: Option<User>,
    account: &SeedAccount,
    password: Option<&UserPassword>,
) -> AuthResult<User>
where
    R: UserRepository,
{
    match (existing, password) {
        (Some(user), _) => Ok(user),
        (None, Some(password)) => create_user(repo, account, password).await,
        (None, None) => Err(AuthError::Internal("Seed password missing".to_string())),
    }
}

/// Create the seed accounts that are missing, all with the same password.
///
/// Without `password` a random one is generated, but only when at least
/// one account is created; existing accounts keep their password.
pub async fn seed_users<R>(repo: Arc<R>, password: Option<RawPassword>) -> AuthResult<SeededUsers>
where
    R: UserRepository,
{
    let repo = repo.as_ref();
    let existing_admin = find_user(repo, &ADMIN_ACCOUNT).await?;
    let existing_user = find_user(repo, &USER_ACCOUNT).await?;

    let mut generated_password = None;
    let hashed = if existing_admin.is_none() || existing_user.is_none() {
        let raw = match password {
            Some(raw) => raw,
            None => {
                let plain = generate_password(GENERATED_PASSWORD_LENGTH, GENERATED_PASSWORD_DIGITS);
                let raw = RawPassword::new(plain.clone())?;
                generated_password = Some(plain);
                raw
            }
        };
        Some(UserPassword::from_raw(&raw)?)
    } else {
        None
    };

    let created = usize::from(existing_admin.is_none()) + usize::from(existing_user.is_none());
    let admin = ensure_user(repo, existing_admin, &ADMIN_ACCOUNT, hashed.as_ref()).await?;
    let user = ensure_user(repo, existing_user, &USER_ACCOUNT, hashed.as_ref()).await?;

    Ok(SeededUsers {
        admin,
        user,
        created,
        generated_password,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryUserRepository;

    fn raw(plain: &str) -> RawPassword {
        RawPassword::for_verification(plain.to_string())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repo = Arc::new(InMemoryUserRepository::default());
        let password = RawPassword::new("seed-password-9".to_string()).unwrap();

        let first = seed_users(repo.clone(), Some(password)).await.unwrap();
        assert_eq!(first.created, 2);
        assert!(first.generated_password.is_none());
        assert!(first.admin.is_admin());
        assert!(first.admin.is_verified);
        assert!(!first.user.is_admin());
        assert!(first.admin.password.verify(&raw("seed-password-9")));

        let other = RawPassword::new("other-password-3".to_string()).unwrap();
        let second = seed_users(repo.clone(), Some(other)).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.admin.id, first.admin.id);
        assert_eq!(second.user.id, first.user.id);
        assert!(second.admin.password.verify(&raw("seed-password-9")));
    }

    #[tokio::test]
    async fn test_generated_password_only_for_new_accounts() {
        let repo = Arc::new(InMemoryUserRepository::default());

        let first = seed_users(repo.clone(), None).await.unwrap();
        let generated = first.generated_password.clone().unwrap();
        assert_eq!(generated.chars().count(), GENERATED_PASSWORD_LENGTH);
        assert!(first.admin.password.verify(&raw(&generated)));
        assert!(first.user.password.verify(&raw(&generated)));

        // Nothing is created, so no new password is generated or reported
        let second = seed_users(repo.clone(), None).await.unwrap();
        assert_eq!(second.created, 0);
        assert!(second.generated_password.is_none());
        assert!(second.admin.password.verify(&raw(&generated)));
    }
}
