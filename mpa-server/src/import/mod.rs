//! Zone Import Pipeline
//!
//! fetch → parse → extract → normalize → load, as one idempotent run.
//!
//! # Failure policy
//!
//! | Stage | Failure | Effect |
//! |-------|---------|--------|
//! | fetch | network, HTTP status, file I/O | fatal, store untouched |
//! | parse | not a FeatureCollection, non-WGS 84 crs | fatal, store untouched |
//! | extract | no geometry, no name, malformed feature | skipped and counted |
//! | normalize | [`GeometryDefect`](crate::geometry::GeometryDefect) | skipped and counted |
//! | load | row refused by the store | skipped and counted |
//! | load | transaction failure | fatal, previous zone set kept |

pub mod features;
pub mod pipeline;
pub mod source;

pub use pipeline::ImportPipeline;
pub use source::DatasetSource;

use std::time::Duration;

use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::RepoError;

/// Default dataset: California Marine Protected Areas [ds582] (CDFW)
pub const DEFAULT_SOURCE_URL: &str = "https://data-cdfw.opendata.arcgis.com/api/download/v1/items/117a99c8745a48c6a48bac70005b1b11/geojson?layers=0";

/// Provenance label stored with each zone of the default dataset
pub const DEFAULT_SOURCE_LABEL: &str =
    "California Marine Protected Areas [ds582], CDFW / California Open Data";

/// Errors that abort an import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("Failed to parse dataset: {0}")]
    Parse(String),

    #[error("Unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),

    #[error("Failed to load zones: {0}")]
    Store(#[from] RepoError),
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        let code = match &err {
            ImportError::Fetch { .. } => ErrorCode::ImportFetchFailed,
            ImportError::Parse(_) => ErrorCode::ImportParseFailed,
            ImportError::UnsupportedCrs(_) => ErrorCode::ImportUnsupportedCrs,
            ImportError::Store(_) => ErrorCode::ImportLoadFailed,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// Features that did not become zones, by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub missing_geometry: usize,
    pub missing_name: usize,
    /// Malformed, unsupported or unrepairable geometry
    pub invalid_geometry: usize,
    pub rejected_by_store: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.missing_geometry + self.missing_name + self.invalid_geometry + self.rejected_by_store
    }
}

/// Summary of one import run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub source: String,
    /// Features present in the dataset
    pub features: usize,
    pub imported: usize,
    /// Zones whose geometry needed repair before loading
    pub repaired: usize,
    pub skipped: SkipCounts,
    pub zones_before: i64,
    pub zones_after: i64,
    pub elapsed: Duration,
}
