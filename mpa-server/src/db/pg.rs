//! PostgreSQL + PostGIS store
//!
//! Spatial predicates and indexing are delegated to PostGIS; this type only
//! owns the pool and forwards to the query functions in
//! [`crate::db::repository`].

use async_trait::async_trait;
use shared::models::{GeoPoint, NearbyZone, NewZone, Vessel, VesselReport, Zone};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::repository::{RepoResult, VesselStore, ZoneLoadOutcome, ZoneStore, vessel, zone};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and apply pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("PostGIS store ready (max_connections = {max_connections})");

        Ok(Self { pool })
    }
}

#[async_trait]
impl ZoneStore for PgStore {
    async fn list_all(&self) -> RepoResult<Vec<Zone>> {
        zone::find_all(&self.pool).await
    }

    async fn find_containing(&self, point: GeoPoint) -> RepoResult<Vec<Zone>> {
        zone::find_containing(&self.pool, point).await
    }

    async fn find_nearby(
        &self,
        point: GeoPoint,
        distance_km: f64,
        limit: usize,
    ) -> RepoResult<Vec<NearbyZone>> {
        zone::find_nearby(&self.pool, point, distance_km, limit).await
    }

    async fn replace_all(&self, zones: Vec<NewZone>) -> RepoResult<ZoneLoadOutcome> {
        zone::replace_all(&self.pool, &zones).await
    }

    async fn count(&self) -> RepoResult<i64> {
        zone::count(&self.pool).await
    }

    async fn describe(&self) -> RepoResult<String> {
        let version: String = sqlx::query_scalar("SELECT PostGIS_Lib_Version()")
            .fetch_one(&self.pool)
            .await?;
        Ok(format!("postgis {version}"))
    }
}

#[async_trait]
impl VesselStore for PgStore {
    async fn upsert(&self, report: VesselReport) -> RepoResult<Vessel> {
        vessel::upsert(&self.pool, &report).await
    }

    async fn get(&self, mmsi: &str) -> RepoResult<Option<Vessel>> {
        vessel::find_by_mmsi(&self.pool, mmsi).await
    }

    async fn count(&self) -> RepoResult<i64> {
        vessel::count(&self.pool).await
    }
}
