//! MPA Server - vessel positions against Marine Protected Area zones
//!
//! # Modules
//!
//! ```text
//! mpa-server/src/
//! ├── core/       # config, state, HTTP server
//! ├── api/        # HTTP routes and handlers
//! ├── services/   # containment queries
//! ├── import/     # zone dataset import pipeline
//! ├── geometry/   # polygon normalization and GeoJSON encoding
//! ├── db/         # store traits, PostGIS and in-memory backends
//! └── utils/      # logging
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod geometry;
pub mod import;
pub mod services;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use db::{MemoryStore, PgStore, VesselStore, ZoneStore};
pub use import::{ImportError, ImportPipeline, ImportReport};
pub use services::ContainmentService;
pub use utils::init_logger_with_file;

/// Install the logger at the configured level and log directory.
///
/// Callers load `.env` first. Returns the file writer guard, which must
/// outlive the process's logging.
pub fn setup_environment(
    config: &Config,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref())
}
