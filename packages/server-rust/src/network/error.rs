//! Conversion of request and operation failures into HTTP error responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::service::OperationError;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// HTTP status code.
    #[schema(example = 400)]
    pub status: u16,
    /// Reason phrase of the status code.
    #[schema(example = "Bad Request")]
    pub error: String,
    /// Human-readable failure message.
    #[schema(example = "Divisão por zero não permitida")]
    pub message: String,
}

/// Failure of an `/operation/*` request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body could not be read as an `OperationRequest`. Never dispatched.
    #[error("{0}")]
    MalformedRequest(String),
    /// The pipeline rejected the operation.
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_)
            | ApiError::Operation(OperationError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Operation(OperationError::Overloaded) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(status = %rejection.status(), "rejecting malformed operation request");
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
