//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the error type every query surfaces to callers:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details (offending field, value, identifier)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a value-out-of-range error for a named field
    pub fn out_of_range(field: &str, value: f64, min: f64, max: f64) -> Self {
        Self::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be between {min} and {max}"),
        )
        .with_detail("field", field)
        .with_detail("value", value)
    }

    /// Create a required-field error
    pub fn required(field: &str) -> Self {
        Self::with_message(ErrorCode::RequiredField, format!("{field} is required"))
            .with_detail("field", field)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a vessel not found error
    pub fn vessel_not_found(mmsi: &str) -> Self {
        Self::with_message(
            ErrorCode::VesselNotFound,
            format!("Vessel {mmsi} not found or has no position"),
        )
        .with_detail("mmsi", mmsi)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConfigError, msg)
    }
}

/// Error body returned by every failing endpoint
///
/// - `code`: Error code
/// - `message`: Human-readable message
/// - `details`: Additional error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl ApiResponse {
    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::error(&self);

        // Log system errors
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::NotFound);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Resource not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("field", "mmsi")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "mmsi");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_out_of_range_carries_field_and_value() {
        let err = AppError::out_of_range("lat", 91.5, -90.0, 90.0);
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(err.message, "lat must be between -90 and 90");
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "lat");
        assert_eq!(details.get("value").unwrap(), 91.5);
        assert_eq!(err.code.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_vessel_not_found() {
        let err = AppError::vessel_not_found("000000000");
        assert_eq!(err.code, ErrorCode::VesselNotFound);
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert!(err.message.contains("000000000"));
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::with_message(ErrorCode::GeometryInvalid, "zone 7: ring not closed");
        assert_eq!(format!("{}", err), "zone 7: ring not closed");
    }

    #[test]
    fn test_api_response_error() {
        let err = AppError::not_found("Vessel").with_detail("mmsi", "123");
        let response = ApiResponse::error(&err);

        assert_eq!(response.code, 3);
        assert_eq!(response.message, "Vessel not found");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_api_response_serialize() {
        let response = ApiResponse::error(&AppError::new(ErrorCode::InternalError));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"code\":9001"));
        assert!(json.contains("\"message\":\"Internal server error\""));
        assert!(!json.contains("details"));
    }
}
