//! Register Use Case
//!
//! Creates a new (non-admin) user account.

use std::sync::Arc;

use crate::application::templates;
use crate::domain::entity::user::{NewUser, User};
use crate::domain::mailer::Mailer;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
    username::Username,
};
use crate::error::{AuthError, AuthResult};

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

pub struct RegisterUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    repo: Arc<R>,
    mailer: Arc<M>,
}

impl<R, M> RegisterUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub fn new(repo: Arc<R>, mailer: Arc<M>) -> Self {
        Self { repo, mailer }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        let username =
            Username::new(&input.username).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(&input.email)?;
        let raw_password = RawPassword::new(input.password)?;

        if self.repo.exists_by_username(&username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password = UserPassword::from_raw(&raw_password)?;

        let display_name = input
            .display_name
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| username.as_str().to_string());

        let user = self
            .repo
            .create(&NewUser {
                email,
                username,
                password,
                display_name: Some(display_name),
                role: UserRole::User,
                is_verified: false,
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            "User registered"
        );

        // Registration has already succeeded; a mail failure is only logged
        let mail = templates::welcome(user.email.as_str(), user.username.as_str());
        if let Err(e) = self.mailer.send(&mail).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to send welcome mail");
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryUserRepository, RecordingMailer};

    fn input(username: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_and_sends_welcome() {
        let repo = Arc::new(InMemoryUserRepository::default());
        let mailer = Arc::new(RecordingMailer::default());
        let use_case = RegisterUseCase::new(repo.clone(), mailer.clone());

        let user = use_case
            .execute(input("alice", "Alice@Example.com", "wonderland42"))
            .await
            .unwrap();

        assert_eq!(user.email.as_str(), "alice@example.com");
        assert_eq!(user.display_name.as_deref(), Some("alice"));
        assert!(!user.is_admin());
        assert_eq!(mailer.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_and_email() {
        let repo = Arc::new(InMemoryUserRepository::default());
        let mailer = Arc::new(RecordingMailer::default());
        let use_case = RegisterUseCase::new(repo, mailer);

        use_case
            .execute(input("alice", "alice@example.com", "wonderland42"))
            .await
            .unwrap();

        let err = use_case
            .execute(input("ALICE", "other@example.com", "wonderland42"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        let err = use_case
            .execute(input("alice2", "ALICE@example.com", "wonderland42"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let repo = Arc::new(InMemoryUserRepository::default());
        let mailer = Arc::new(RecordingMailer::default());
        let use_case = RegisterUseCase::new(repo, mailer);

        let err = use_case
            .execute(input("al", "alice@example.com", "wonderland42"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = use_case
            .execute(input("alice", "not-an-email", "wonderland42"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = use_case
            .execute(input("alice", "alice@example.com", "12345678"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordPolicy(_)));
    }

    #[tokio::test]
    async fn test_mail_failure_does_not_fail_registration() {
        let repo = Arc::new(InMemoryUserRepository::default());
        let mailer = Arc::new(RecordingMailer::failing());
        let use_case = RegisterUseCase::new(repo, mailer);

        assert!(
            use_case
                .execute(input("alice", "alice@example.com", "wonderland42"))
                .await
                .is_ok()
        );
    }
}
