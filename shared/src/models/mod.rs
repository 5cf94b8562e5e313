//! Data models
//!
//! Shared between the query service, the import tool and API clients.
//! `Vessel` and `NearbyZone` derive `sqlx::FromRow` with the `db` feature.

pub mod containment;
pub mod position;
pub mod vessel;
pub mod zone;

// Re-exports
pub use containment::*;
pub use position::*;
pub use vessel::*;
pub use zone::*;
