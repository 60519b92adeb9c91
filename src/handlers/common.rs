use crate::errors::{ErrorCategory, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// Collapses cart resolution failures into the single client-facing
/// "problem with your cart" error. Upstream and internal errors pass through.
pub fn map_cart_error(err: ServiceError) -> ServiceError {
    match err.category() {
        ErrorCategory::NotFound | ErrorCategory::InvalidState | ErrorCategory::Validation => {
            ServiceError::CartProblem(err.to_string())
        }
        _ => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn cart_errors_become_cart_problems() {
        assert_matches!(
            map_cart_error(ServiceError::InvalidCartLine(3)),
            ServiceError::CartProblem(msg) if msg.contains("unknown product 3")
        );
        assert_matches!(
            map_cart_error(ServiceError::ExternalServiceError("down".into())),
            ServiceError::ExternalServiceError(_)
        );
    }
}
