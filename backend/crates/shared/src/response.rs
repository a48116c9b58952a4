//! Success envelope
//!
//! Every successful response has the shape
//! `{"success": true, "data": ..., "message"?: ..., "pagination"?: {...}}`.
//! Errors use the same `success` flag, see `AppError`'s `IntoResponse`.

use std::borrow::Cow;

use serde::Serialize;

use crate::pagination::PageRequest;

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Envelope with only a message (logout, delete, ...)
    pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

/// Pagination block. `totalPages` keeps the casing the frontend reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = u64::from(request.limit());
        Self {
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: total.div_ceil(limit),
        }
    }
}

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope() {
        let body = serde_json::to_value(ApiResponse::ok(json!({"id": 1}))).unwrap();
        assert_eq!(body, json!({"success": true, "data": {"id": 1}}));
    }

    #[test]
    fn test_message_envelope() {
        let body = serde_json::to_value(ApiResponse::message("Post deleted")).unwrap();
        assert_eq!(body, json!({"success": true, "message": "Post deleted"}));
    }

    #[test]
    fn test_pagination_total_pages() {
        let page = PageRequest::new(Some(2), Some(10));
        let p = Pagination::new(page, 21);
        assert_eq!(p.total_pages, 3);

        let body = serde_json::to_value(ApiResponse::paginated(vec![1, 2], p)).unwrap();
        assert_eq!(body["pagination"]["totalPages"], 3);
        assert_eq!(body["pagination"]["page"], 2);
    }

    #[test]
    fn test_empty_listing_has_zero_pages() {
        let p = Pagination::new(PageRequest::default(), 0);
        assert_eq!(p.total_pages, 0);
    }
}
