//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::value_object::{email::Email, username::Username};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user and return it with its assigned id
    async fn create(&self, user: &NewUser) -> AuthResult<User>;

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Case-insensitive
    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Persist password, reset token and profile fields
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Users holding a reset token that has not expired at `now`
    async fn find_with_active_reset_tokens(&self, now: DateTime<Utc>) -> AuthResult<Vec<User>>;
}
