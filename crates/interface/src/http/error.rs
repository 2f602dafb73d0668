// Maps domain errors onto HTTP responses. Infrastructure details never leak
// into the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use person_registry_domain::DomainError;
use serde_json::json;
use tracing::error;

pub struct ApiError(DomainError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            DomainError::Validation { errors } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation failed", "details": errors }),
            ),
            DomainError::NotFound { .. } | DomainError::RelationNotFound { .. } => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.0.to_string() }),
            ),
            DomainError::AlreadyExists { .. } => (
                StatusCode::CONFLICT,
                json!({ "error": self.0.to_string() }),
            ),
            DomainError::Infrastructure { message } => {
                error!(%message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
