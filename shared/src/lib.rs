//! Shared types for the MPA monitor
//!
//! Domain models and the unified error system used by the query service,
//! the import tool and API clients.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
