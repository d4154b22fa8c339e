use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledgersync_common::error::LedgerError;

pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LedgerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            LedgerError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            LedgerError::Queue(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            other => {
                tracing::error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
