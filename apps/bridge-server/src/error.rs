//! API error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use bridge_db::DbError;
use bridge_sync::SyncError;

/// Errors surfaced by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Upstream directory error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DeviceUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::DeviceRequest(msg) => ApiError::DeviceUnavailable(msg),
            SyncError::InvalidConfig(msg) => ApiError::InvalidRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::NotFound("device".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::DeviceUnavailable("timeout".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::InvalidRequest("slot 9".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_sync_error_mapping() {
        let api: ApiError = SyncError::DeviceRequest("unreachable".into()).into();
        assert!(matches!(api, ApiError::DeviceUnavailable(_)));
    }
}
