//! API DTOs (Data Transfer Objects)
//!
//! Request bodies default missing string fields to empty so that the use
//! cases report them as validation errors (400) instead of a JSON
//! rejection.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;

// ============================================================================
// User
// ============================================================================

/// Public view of a user; the password hash and reset token never leave
/// the server
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub is_verified: bool,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            display_name: user.display_name.clone(),
            bio: user.bio.clone(),
            avatar: user.avatar.clone(),
            is_admin: user.is_admin(),
            is_verified: user.is_verified,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Register / Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

// ============================================================================
// Password
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ForgotPasswordResponse {
    /// Development only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_reset_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyTokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        email::Email,
        user_password::{RawPassword, UserPassword},
        user_role::UserRole,
        username::Username,
    };

    #[test]
    fn test_user_response_hides_secrets() {
        let now = Utc::now();
        let raw = RawPassword::for_verification("secret-pass1".to_string());
        let user = User {
            id: UserId::new(7),
            email: Email::from_db("alice@example.com"),
            username: Username::from_db("alice"),
            password: UserPassword::from_raw(&raw).unwrap(),
            display_name: Some("Alice".to_string()),
            bio: None,
            avatar: None,
            role: UserRole::Admin,
            is_verified: true,
            reset_token: None,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["is_admin"], true);
        assert_eq!(json["display_name"], "Alice");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("reset_token").is_none());
    }

    #[test]
    fn test_register_request_missing_fields_default_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert_eq!(req.username, "bob");
        assert!(req.email.is_empty());
        assert!(req.display_name.is_none());
    }
}
