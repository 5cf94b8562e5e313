//! Vessel database operations (PostGIS)

use shared::models::{Vessel, VesselReport};
use sqlx::PgPool;

use super::RepoResult;

const VESSEL_COLUMNS: &str = "mmsi, name, last_lat AS lat, last_lon AS lon, last_ts AS updated_at";

/// Single-statement upsert, last write wins.
pub async fn upsert(pool: &PgPool, report: &VesselReport) -> RepoResult<Vessel> {
    let sql = format!(
        r#"
        INSERT INTO vessels (mmsi, name, last_lat, last_lon, last_ts)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (mmsi)
        DO UPDATE SET
            name = COALESCE(EXCLUDED.name, vessels.name),
            last_lat = EXCLUDED.last_lat,
            last_lon = EXCLUDED.last_lon,
            last_ts = EXCLUDED.last_ts
        RETURNING {VESSEL_COLUMNS}
        "#
    );
    let vessel: Vessel = sqlx::query_as(&sql)
        .bind(&report.mmsi)
        .bind(&report.name)
        .bind(report.position.lat())
        .bind(report.position.lon())
        .fetch_one(pool)
        .await?;
    Ok(vessel)
}

pub async fn find_by_mmsi(pool: &PgPool, mmsi: &str) -> RepoResult<Option<Vessel>> {
    let sql = format!("SELECT {VESSEL_COLUMNS} FROM vessels WHERE mmsi = $1");
    let vessel: Option<Vessel> = sqlx::query_as(&sql)
        .bind(mmsi)
        .fetch_optional(pool)
        .await?;
    Ok(vessel)
}

pub async fn count(pool: &PgPool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vessels")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
