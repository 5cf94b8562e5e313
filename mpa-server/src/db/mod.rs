//! Database layer
//!
//! - [`PgStore`] - PostgreSQL + PostGIS (production)
//! - [`MemoryStore`] - in-process R-tree store (development, tests)

pub mod memory;
pub mod pg;
pub mod repository;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use repository::{RepoError, RepoResult, VesselStore, ZoneLoadOutcome, ZoneStore};
