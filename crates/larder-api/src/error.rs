//! HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

/// Error returned by handlers; renders as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    /// Storage or internal failure (500).
    Core(larder_core::Error),
    NotFound(String),
    BadRequest(String),
}

impl From<larder_core::Error> for ApiError {
    fn from(err: larder_core::Error) -> Self {
        match err {
            larder_core::Error::RecipeNotFound(id) => {
                ApiError::NotFound(format!("Recipe {} not found", id))
            }
            larder_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Core(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            ApiError::Core(err) => {
                error!(error = %err, "Request failed");
                err.to_string()
            }
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
