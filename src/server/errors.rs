use crate::HarvestError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by request handlers
#[derive(Debug)]
pub struct AppError(HarvestError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            HarvestError::UnknownCategory(_) => {
                return (StatusCode::NOT_FOUND, "Page not Found").into_response();
            }
            HarvestError::DiscoveryFailed { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("Request failed: {}", self.0);
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<HarvestError> for AppError {
    fn from(err: HarvestError) -> Self {
        Self(err)
    }
}
