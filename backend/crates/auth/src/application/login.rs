//! Login Use Case
//!
//! Verifies email + password and issues a JWT.

use std::sync::Arc;

use platform::jwt::JwtCodec;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub token: String,
    pub user: User,
}

pub struct LoginUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    jwt: Arc<JwtCodec>,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, jwt: Arc<JwtCodec>) -> Self {
        Self { repo, jwt }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        // A malformed email cannot belong to anyone
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let raw_password = RawPassword::for_verification(input.password);
        if !user.password.verify(&raw_password) {
            return Err(AuthError::InvalidCredentials);
        }

        if user.password.needs_rehash() {
            tracing::info!(user_id = %user.id, "Password hash uses outdated parameters");
        }

        let token = self
            .jwt
            .issue(user.id.get(), user.email.as_str(), user.role.code())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutput { token, user })
    }
}
