//! Password Reset Use Cases
//!
//! forgot → (mail with link) → verify-token → reset.
//!
//! Tokens are looked up by scanning every user that holds an unexpired
//! token and comparing digests in constant time. The plain token is never
//! stored, so there is nothing to index on.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::application::templates;
use crate::domain::entity::{password_reset::PasswordResetToken, user::User};
use crate::domain::mailer::Mailer;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Find the user whose unexpired reset token matches `token`
async fn resolve_reset_token<R>(repo: &R, token: &str, now: DateTime<Utc>) -> AuthResult<Option<User>>
where
    R: UserRepository,
{
    let candidates = repo.find_with_active_reset_tokens(now).await?;

    // Every candidate is compared, even after a hit
    let mut matched = None;
    for user in candidates {
        if user.has_valid_reset_token(token, now) && matched.is_none() {
            matched = Some(user);
        }
    }
    Ok(matched)
}

fn require_token(token: &str) -> AuthResult<&str> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingResetToken);
    }
    Ok(token)
}

// ============================================================================
// Forgot password
// ============================================================================

pub struct ForgotPasswordOutput {
    /// Only set when the account exists and the config exposes reset links
    pub reset_url: Option<String>,
}

pub struct ForgotPasswordUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<R, M> ForgotPasswordUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub fn new(repo: Arc<R>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            mailer,
            config,
        }
    }

    /// Succeeds the same way whether or not the email belongs to an account
    pub async fn execute(&self, email: &str) -> AuthResult<ForgotPasswordOutput> {
        let email = Email::new(email)?;

        let Some(mut user) = self.repo.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(ForgotPasswordOutput { reset_url: None });
        };

        let now = Utc::now();
        let (plain, token) = PasswordResetToken::issue(now, self.config.reset_token_ttl);
        let expires_at = token.expires_at();
        user.set_reset_token(token, now);
        self.repo.update(&user).await?;

        let reset_url = self.config.reset_url(&plain);
        let mail = templates::password_reset(
            user.email.as_str(),
            user.username.as_str(),
            &reset_url,
            self.config.reset_token_ttl.num_minutes(),
        );
        if let Err(e) = self.mailer.send(&mail).await {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send password reset mail");
        }

        tracing::info!(user_id = %user.id, %expires_at, "Password reset token issued");

        if self.config.expose_reset_url {
            tracing::info!(user_id = %user.id, url = %reset_url, "Development password reset link");
            return Ok(ForgotPasswordOutput {
                reset_url: Some(reset_url),
            });
        }

        Ok(ForgotPasswordOutput { reset_url: None })
    }
}

// ============================================================================
// Verify token
// ============================================================================

pub struct VerifyResetTokenUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> VerifyResetTokenUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Expiry of the token when it is valid
    pub async fn execute(&self, token: &str) -> AuthResult<DateTime<Utc>> {
        let token = require_token(token)?;
        let user = resolve_reset_token(self.repo.as_ref(), token, Utc::now())
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        user.reset_token
            .map(|t| t.expires_at())
            .ok_or(AuthError::InvalidResetToken)
    }
}

// ============================================================================
// Reset password
// ============================================================================

pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ResetPasswordUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> ResetPasswordUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<()> {
        let token = require_token(&input.token)?;

        if input.new_password != input.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        let new_password = RawPassword::new(input.new_password)?;

        let now = Utc::now();
        let mut user = resolve_reset_token(self.repo.as_ref(), token, now)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        // Also clears the token, so the link works once
        user.set_password(UserPassword::from_raw(&new_password)?, now);
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "Password reset completed");

        Ok(())
    }
}
