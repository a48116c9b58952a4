//! User Entity

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entity::password_reset::PasswordResetToken;
use crate::domain::value_object::{
    email::Email, user_password::UserPassword, user_role::UserRole, username::Username,
};

/// User account as stored in `users`
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: Username,
    /// Never serialized
    pub password: UserPassword,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
    /// Outstanding password reset, if any
    pub reset_token: Option<PasswordResetToken>,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Replace the password hash. Any outstanding reset token is dropped
    /// as well, since it was issued for the old password.
    pub fn set_password(&mut self, password: UserPassword, now: DateTime<Utc>) {
        self.password = password;
        self.password_changed_at = Some(now);
        self.reset_token = None;
        self.updated_at = now;
    }

    pub fn set_reset_token(&mut self, token: PasswordResetToken, now: DateTime<Utc>) {
        self.reset_token = Some(token);
        self.updated_at = now;
    }

    /// True when an unexpired reset token matches `plain`
    pub fn has_valid_reset_token(&self, plain: &str, now: DateTime<Utc>) -> bool {
        self.reset_token
            .as_ref()
            .is_some_and(|t| !t.is_expired(now) && t.matches(plain))
    }
}

/// Data needed to insert a user; the database assigns id and timestamps
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub username: Username,
    pub password: UserPassword,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
}
