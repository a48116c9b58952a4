//! Change Password Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ChangePasswordUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> ChangePasswordUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Checks run in this order: confirmation, difference from the current
    /// password, policy, then the current password against the stored hash.
    pub async fn execute(&self, user_id: UserId, input: ChangePasswordInput) -> AuthResult<()> {
        if input.new_password != input.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let current = RawPassword::for_verification(input.current_password);
        let candidate = RawPassword::for_verification(input.new_password.clone());
        if current.same_as(&candidate) {
            return Err(AuthError::PasswordUnchanged);
        }

        let new_password = RawPassword::new(input.new_password)?;

        let mut user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.password.verify(&current) {
            return Err(AuthError::CurrentPasswordIncorrect);
        }

        user.set_password(UserPassword::from_raw(&new_password)?, Utc::now());
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "Password changed");

        Ok(())
    }
}
