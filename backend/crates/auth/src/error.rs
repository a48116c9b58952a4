//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::client::BearerError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Never says which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    /// Malformed request field (email, username, ...)
    #[error("{0}")]
    Validation(String),

    /// New password rejected by the password policy
    #[error("{0}")]
    PasswordPolicy(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("New password must be different from the current password")]
    PasswordUnchanged,

    #[error("Current password is incorrect")]
    CurrentPasswordIncorrect,

    #[error("Token is required")]
    MissingResetToken,

    /// Unknown, expired or already used reset token
    #[error("Invalid or expired token")]
    InvalidResetToken,

    #[error("Authorization header required")]
    MissingAuthorization,

    #[error("Invalid authorization header format")]
    MalformedAuthorization,

    /// Bad signature, wrong algorithm or expired JWT
    #[error("Invalid token")]
    InvalidToken,

    #[error("Admin access required")]
    Forbidden,

    #[error("Too many requests")]
    RateLimited { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::CurrentPasswordIncorrect
            | AuthError::MissingAuthorization
            | AuthError::MalformedAuthorization
            | AuthError::InvalidToken => ErrorKind::Unauthorized,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::UsernameTaken | AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::Validation(_)
            | AuthError::PasswordPolicy(_)
            | AuthError::PasswordMismatch
            | AuthError::PasswordUnchanged
            | AuthError::MissingResetToken
            | AuthError::InvalidResetToken => ErrorKind::BadRequest,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            AuthError::InvalidResetToken => err.with_action("Request a new password reset link"),
            AuthError::InvalidToken => err.with_action("Please sign in again"),
            AuthError::RateLimited { .. } => err.with_action("Please wait before trying again"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidResetToken => {
                tracing::warn!("Invalid or expired password reset token presented");
            }
            AuthError::RateLimited { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Auth rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let mut response = self.to_app_error().into_response();
        if let AuthError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            AuthError::Validation(err.message().to_string())
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        // Lost a race against a concurrent registration
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                match db_err.constraint() {
                    Some(c) if c.contains("email") => return AuthError::EmailTaken,
                    Some(c) if c.contains("username") => return AuthError::UsernameTaken,
                    _ => {}
                }
            }
        }
        AuthError::Database(err)
    }
}

impl From<BearerError> for AuthError {
    fn from(err: BearerError) -> Self {
        match err {
            BearerError::Missing => AuthError::MissingAuthorization,
            BearerError::Malformed => AuthError::MalformedAuthorization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidResetToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::RateLimited { retry_after_secs: 3 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AuthError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_app_error_becomes_validation() {
        let err: AuthError = AppError::bad_request("Invalid email format").into();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "Invalid email format"));

        let err: AuthError = AppError::internal("boom").into();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AuthError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn test_bearer_error_mapping() {
        assert!(matches!(
            AuthError::from(BearerError::Missing),
            AuthError::MissingAuthorization
        ));
        assert!(matches!(
            AuthError::from(BearerError::Malformed),
            AuthError::MalformedAuthorization
        ));
    }
}
