//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::VesselNotFound => StatusCode::NOT_FOUND,

            // 422 Unprocessable (well-formed input the domain cannot accept)
            Self::GeometryInvalid | Self::ImportUnsupportedCrs => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 502 Bad Gateway (upstream dataset unreachable)
            Self::ImportFetchFailed => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::ImportLoadFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
