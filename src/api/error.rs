use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::domain::order::OrderError;

// ============================================================================
// API Errors - map lifecycle failures onto HTTP responses
// ============================================================================
//
// Body shape for every failure: {"error": "<category>", "message": "<detail>"}
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn category(&self) -> &'static str {
        match self {
            ApiError::Order(OrderError::Validation { .. }) => "validation_error",
            ApiError::Order(OrderError::NotFound(_)) => "not_found",
            ApiError::Order(OrderError::InvalidTransition { .. }) => "invalid_transition",
            ApiError::Order(OrderError::Storage(_)) => "storage_error",
            ApiError::BadRequest(_) => "bad_request",
        }
    }

    fn message(&self) -> String {
        match self {
            // storage details stay in the logs
            ApiError::Order(OrderError::Storage(_)) => "Internal storage failure".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Order(OrderError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Order(OrderError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Order(OrderError::Validation { .. })
            | ApiError::Order(OrderError::InvalidTransition { .. })
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.category(),
            "message": self.message(),
        }))
    }
}
