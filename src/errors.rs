use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::commerce::money::MoneyError;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every JSON endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Bad Request",
    "message": "No payment intent for this order",
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    pub timestamp: String,
}

/// Coarse classification used by callers that branch on the kind of failure
/// rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    InvalidState,
    Signature,
    Persistence,
    Validation,
    Upstream,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Cart not found: {0}")]
    CartNotFound(String),

    #[error("No payment intent for cart {0}")]
    NoPaymentIntent(String),

    #[error("Cart references unknown product {0}")]
    InvalidCartLine(i32),

    #[error("Product {0} is no longer available")]
    ProductUnavailable(i32),

    #[error("Delivery method {0} not found")]
    InvalidDeliveryMethod(i32),

    #[error("Problem saving {0}")]
    PersistenceFailed(String),

    #[error("Problem with your cart: {0}")]
    CartProblem(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("Payment provider error: {0}")]
    ExternalServiceError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<MoneyError> for ServiceError {
    fn from(err: MoneyError) -> Self {
        ServiceError::AmountOutOfRange(err.to_string())
    }
}

impl From<redis::RedisError> for ServiceError {
    fn from(err: redis::RedisError) -> Self {
        ServiceError::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl ServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CartNotFound(_)
            | Self::InvalidCartLine(_)
            | Self::ProductUnavailable(_)
            | Self::InvalidDeliveryMethod(_)
            | Self::NotFound(_) => ErrorCategory::NotFound,
            Self::NoPaymentIntent(_) => ErrorCategory::InvalidState,
            Self::InvalidSignature(_) => ErrorCategory::Signature,
            Self::PersistenceFailed(_) => ErrorCategory::Persistence,
            Self::ValidationError(_)
            | Self::CartProblem(_)
            | Self::InvalidPayload(_)
            | Self::AmountOutOfRange(_)
            | Self::Unauthorized(_) => ErrorCategory::Validation,
            Self::ExternalServiceError(_) => ErrorCategory::Upstream,
            Self::DatabaseError(_)
            | Self::CacheError(_)
            | Self::SerializationError(_)
            | Self::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::CartNotFound(_)
            | Self::NoPaymentIntent(_)
            | Self::InvalidCartLine(_)
            | Self::ProductUnavailable(_)
            | Self::InvalidDeliveryMethod(_)
            | Self::PersistenceFailed(_)
            | Self::CartProblem(_)
            | Self::ValidationError(_)
            | Self::InvalidPayload(_)
            | Self::AmountOutOfRange(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidSignature(_)
            | Self::DatabaseError(_)
            | Self::CacheError(_)
            | Self::SerializationError(_)
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::CacheError(_) | Self::SerializationError(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
            Self::InvalidSignature(_) => "Webhook error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}
