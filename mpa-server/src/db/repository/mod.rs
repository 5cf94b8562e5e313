//! Repository Module
//!
//! Store traits shared by every backend, plus the PostGIS queries behind
//! [`crate::db::PgStore`].
//!
//! Callers hold stores as `Arc<dyn ZoneStore>` / `Arc<dyn VesselStore>`.
//! Coordinates and identifiers are validated before they reach a store.

pub mod vessel;
pub mod zone;

use async_trait::async_trait;
use shared::models::{GeoPoint, NearbyZone, NewZone, Vessel, VesselReport, Zone};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Geometry error: {0}")]
    Geometry(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for RepoError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        RepoError::Database(format!("migration failed: {err}"))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Geometry(msg) => AppError::with_message(ErrorCode::GeometryInvalid, msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Store error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// What a zone reload did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneLoadOutcome {
    pub inserted: usize,
    /// Rows the store refused (constraint violations); skipped, not fatal
    pub rejected: usize,
}

/// Persisted protected-area zones
#[async_trait]
pub trait ZoneStore: Send + Sync {
    /// All zones ordered by id
    async fn list_all(&self) -> RepoResult<Vec<Zone>>;

    /// Zones whose geometry contains or touches the point, ordered by id
    async fn find_containing(&self, point: GeoPoint) -> RepoResult<Vec<Zone>>;

    /// Zones within `distance_km` of the point, nearest first (ties by id),
    /// at most `limit`. Distance is 0 for zones containing the point.
    async fn find_nearby(
        &self,
        point: GeoPoint,
        distance_km: f64,
        limit: usize,
    ) -> RepoResult<Vec<NearbyZone>>;

    /// Atomically swap the whole zone set (import only).
    ///
    /// On error the previous zone set stays visible.
    async fn replace_all(&self, zones: Vec<NewZone>) -> RepoResult<ZoneLoadOutcome>;

    async fn count(&self) -> RepoResult<i64>;

    /// Short backend description for diagnostics
    async fn describe(&self) -> RepoResult<String>;
}

/// Last-known vessel positions, one record per identifier
#[async_trait]
pub trait VesselStore: Send + Sync {
    /// Create or overwrite the record, stamping `updated_at` with the
    /// current time. An absent name keeps the stored one.
    async fn upsert(&self, report: VesselReport) -> RepoResult<Vessel>;

    async fn get(&self, mmsi: &str) -> RepoResult<Option<Vessel>>;

    async fn count(&self) -> RepoResult<i64>;
}
