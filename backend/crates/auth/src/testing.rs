//! In-memory doubles for use case and router tests

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use platform::jwt::JwtCodec;
use tokio::sync::Mutex;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::mailer::{MailMessage, Mailer};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
    username::Username,
};
use crate::error::{AuthError, AuthResult};

pub const TEST_JWT_SECRET: &[u8] = b"test-secret-for-unit-tests";

pub fn jwt() -> JwtCodec {
    JwtCodec::new(TEST_JWT_SECRET, Duration::hours(1))
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Insert directly, bypassing the password policy
    pub async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> User {
        let raw = RawPassword::for_verification(password.to_string());
        let new_user = NewUser {
            email: Email::new(email).unwrap(),
            username: Username::new(username).unwrap(),
            password: UserPassword::from_raw(&raw).unwrap(),
            display_name: Some(username.to_string()),
            role: UserRole::from_is_admin(is_admin),
            is_verified: false,
        };
        self.create(&new_user).await.unwrap()
    }

    pub async fn get(&self, id: UserId) -> Option<User> {
        self.users.lock().await.iter().find(|u| u.id == id).cloned()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        let lowered = user.username.as_str().to_lowercase();
        if users.iter().any(|u| u.username.as_str().to_lowercase() == lowered) {
            return Err(AuthError::UsernameTaken);
        }

        let now = Utc::now();
        let created = User {
            id: UserId::new(users.len() as i64 + 1),
            email: user.email.clone(),
            username: user.username.clone(),
            password: user.password.clone(),
            display_name: user.display_name.clone(),
            bio: None,
            avatar: None,
            role: user.role,
            is_verified: user.is_verified,
            reset_token: None,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        Ok(self.get(id).await)
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool> {
        let lowered = username.as_str().to_lowercase();
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .any(|u| u.username.as_str().to_lowercase() == lowered))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.users.lock().await.iter().any(|u| &u.email == email))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.lock().await;
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AuthError::UserNotFound)?;
        *slot = user.clone();
        Ok(())
    }

    async fn find_with_active_reset_tokens(&self, now: DateTime<Utc>) -> AuthResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .filter(|u| u.reset_token.as_ref().is_some_and(|t| !t.is_expired(now)))
            .cloned()
            .collect())
    }
}

/// Keeps every message; `failing()` rejects every send
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().await.clone()
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> AuthResult<()> {
        if self.fail {
            return Err(AuthError::Internal("mail transport unavailable".to_string()));
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}
