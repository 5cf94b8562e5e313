//! Unified error codes for the MPA monitor
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Zone errors
//! - 2xxx: Vessel errors
//! - 3xxx: Import errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the map frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Zone ====================
    /// Zone geometry is invalid and could not be repaired
    GeometryInvalid = 1002,

    // ==================== 2xxx: Vessel ====================
    /// Vessel not found
    VesselNotFound = 2001,
    /// Vessel identifier is malformed
    VesselIdInvalid = 2002,

    // ==================== 3xxx: Import ====================
    /// Dataset could not be fetched
    ImportFetchFailed = 3001,
    /// Dataset could not be parsed
    ImportParseFailed = 3002,
    /// Dataset uses an unsupported coordinate reference system
    ImportUnsupportedCrs = 3003,
    /// Zones could not be loaded into the store
    ImportLoadFailed = 3004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Zone
            ErrorCode::GeometryInvalid => "Zone geometry is invalid",

            // Vessel
            ErrorCode::VesselNotFound => "Vessel not found or has no position",
            ErrorCode::VesselIdInvalid => "Vessel identifier is invalid",

            // Import
            ErrorCode::ImportFetchFailed => "Failed to fetch zone dataset",
            ErrorCode::ImportParseFailed => "Failed to parse zone dataset",
            ErrorCode::ImportUnsupportedCrs => "Unsupported coordinate reference system",
            ErrorCode::ImportLoadFailed => "Failed to load zones into the store",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Zone
            1002 => Ok(ErrorCode::GeometryInvalid),

            // Vessel
            2001 => Ok(ErrorCode::VesselNotFound),
            2002 => Ok(ErrorCode::VesselIdInvalid),

            // Import
            3001 => Ok(ErrorCode::ImportFetchFailed),
            3002 => Ok(ErrorCode::ImportParseFailed),
            3003 => Ok(ErrorCode::ImportUnsupportedCrs),
            3004 => Ok(ErrorCode::ImportLoadFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
