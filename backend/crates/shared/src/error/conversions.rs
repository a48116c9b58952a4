//! Error conversions - turning [`AppError`] into an HTTP response
//!
//! Domain crates convert their own errors (`AuthError`, `BlogError`) into
//! [`AppError`]; this module is the single place where that error becomes
//! a status code and a JSON body.

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

/// Error body shared by every route:
/// `{"success": false, "error": <kind title>, "message": <detail>, "action": <hint|null>}`
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Internal details stay in the logs
        let message = if self.is_server_error() {
            self.kind().as_str()
        } else {
            self.message()
        };

        let body = serde_json::json!({
            "success": false,
            "error": self.kind().as_str(),
            "message": message,
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}
