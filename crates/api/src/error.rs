use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::CarpoolError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::CapacityExceeded(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match self {
            ApiError::NotFound(msg) => ("not_found", msg),
            ApiError::CapacityExceeded(msg) => ("capacity_exceeded", msg),
            ApiError::Forbidden(msg) => ("authorization_failed", msg),
            ApiError::Validation(msg) => ("validation_error", msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string())
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<CarpoolError> for ApiError {
    fn from(err: CarpoolError) -> Self {
        let message = err.to_string();
        match err {
            CarpoolError::NotFound(_) => ApiError::NotFound(message),
            CarpoolError::CapacityExceeded { .. } => ApiError::CapacityExceeded(message),
            CarpoolError::AuthorizationFailed(msg) => ApiError::Forbidden(msg),
            CarpoolError::Validation(msg) => ApiError::Validation(msg),
            CarpoolError::Transport(_) => ApiError::Internal(message),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CarpoolError::from(errors).into()
    }
}
