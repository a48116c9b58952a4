//! Blog Error Types
//!
//! Blog-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Blog-specific result type alias
pub type BlogResult<T> = Result<T, BlogError>;

#[derive(Debug, Error)]
pub enum BlogError {
    /// Also returned for drafts the caller may not see
    #[error("Post not found")]
    PostNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Tag not found")]
    TagNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Caller is neither the author nor an admin
    #[error("You do not have permission to modify this post")]
    NotAuthor,

    #[error("No file uploaded")]
    NoFile,

    #[error("File size exceeds maximum limit of {max_bytes} bytes")]
    FileTooLarge { max_bytes: u64 },

    #[error("File type not allowed")]
    UnsupportedFileType,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BlogError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BlogError::PostNotFound
            | BlogError::CategoryNotFound
            | BlogError::TagNotFound
            | BlogError::CommentNotFound => ErrorKind::NotFound,
            BlogError::Validation(_) | BlogError::NoFile => ErrorKind::BadRequest,
            BlogError::Conflict(_) => ErrorKind::Conflict,
            BlogError::NotAuthor => ErrorKind::Forbidden,
            BlogError::FileTooLarge { .. } => ErrorKind::PayloadTooLarge,
            BlogError::UnsupportedFileType => ErrorKind::UnsupportedMediaType,
            BlogError::Storage(_) | BlogError::Database(_) | BlogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            BlogError::UnsupportedFileType => {
                err.with_action("Allowed types: .jpg .jpeg .png .gif .webp .pdf")
            }
            _ => err,
        }
    }

    fn log(&self) {
        match self {
            BlogError::Database(e) => tracing::error!(error = %e, "Blog database error"),
            BlogError::Storage(e) => tracing::error!(error = %e, "Upload storage error"),
            BlogError::Internal(msg) => tracing::error!(message = %msg, "Blog internal error"),
            _ => tracing::debug!(error = %self, "Blog error"),
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for BlogError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            BlogError::Validation(err.message().to_string())
        } else {
            BlogError::Internal(err.to_string())
        }
    }
}

impl From<sqlx::Error> for BlogError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let message = match db_err.constraint() {
                    Some(c) if c.contains("slug") => "Slug already exists",
                    Some(c) if c.contains("name") => "Name already exists",
                    _ => "Resource already exists",
                };
                return BlogError::Conflict(message.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return BlogError::Validation("Referenced resource does not exist".to_string());
            }
        }
        BlogError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BlogError::PostNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BlogError::NotAuthor.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(BlogError::NoFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            BlogError::FileTooLarge { max_bytes: 1 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            BlogError::UnsupportedFileType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            BlogError::Conflict("Slug already exists".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_client_app_error_becomes_validation() {
        let err: BlogError = AppError::bad_request("Invalid email format").into();
        assert!(matches!(err, BlogError::Validation(ref m) if m == "Invalid email format"));
    }
}
