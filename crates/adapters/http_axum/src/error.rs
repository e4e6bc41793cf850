//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use meterhub_domain::error::{MeterHubError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`MeterHubError`] and unreadable request bodies to an HTTP response
/// with the same `{"error": ...}` shape.
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by a service.
    Domain(MeterHubError),
    /// Body missing, malformed, or of the wrong shape.
    Body(JsonRejection),
}

impl From<MeterHubError> for ApiError {
    fn from(err: MeterHubError) -> Self {
        Self::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl ApiError {
    /// Status code this error is reported with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let err = match self {
            Self::Domain(err) => err,
            Self::Body(rejection) => return rejection.status(),
        };
        match err {
            MeterHubError::Validation(_) | MeterHubError::InvalidState(_) => {
                StatusCode::BAD_REQUEST
            }
            MeterHubError::NotFound(_) => StatusCode::NOT_FOUND,
            MeterHubError::Conflict(_) => StatusCode::CONFLICT,
            MeterHubError::Schema(_) | MeterHubError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Body(rejection) => rejection.body_text(),
            Self::Domain(MeterHubError::Validation(err)) => err.to_string(),
            Self::Domain(MeterHubError::InvalidState(err)) => err.to_string(),
            Self::Domain(MeterHubError::NotFound(err)) => err.to_string(),
            Self::Domain(MeterHubError::Conflict(err)) => err.to_string(),
            Self::Domain(MeterHubError::Schema(err)) => {
                tracing::error!(error = %err, "schema error");
                "internal server error".to_string()
            }
            Self::Domain(MeterHubError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                "internal server error".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
