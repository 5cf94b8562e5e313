//! Zone database operations (PostGIS)

use chrono::{DateTime, Utc};
use shared::models::{GeoPoint, NearbyZone, NewZone, Zone};
use sqlx::PgPool;

use super::{RepoError, RepoResult, ZoneLoadOutcome};
use crate::geometry::{parse_multipolygon, to_geojson};

/// 15 decimals, the PostGIS maximum; the default of 9 rounds stored vertices.
const ZONE_COLUMNS: &str =
    "id, name, designation, ST_AsGeoJSON(geom, 15) AS geojson, source, created_at";

#[derive(sqlx::FromRow)]
struct ZoneRow {
    id: i64,
    name: String,
    designation: Option<String>,
    geojson: String,
    source: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ZoneRow> for Zone {
    type Error = RepoError;

    fn try_from(row: ZoneRow) -> Result<Self, Self::Error> {
        let geometry = parse_multipolygon(&row.geojson)
            .map_err(|e| RepoError::Geometry(format!("zone {}: {e}", row.id)))?;
        Ok(Zone {
            id: row.id,
            name: row.name,
            designation: row.designation,
            geometry,
            source: row.source,
            created_at: row.created_at,
        })
    }
}

fn into_zones(rows: Vec<ZoneRow>) -> RepoResult<Vec<Zone>> {
    rows.into_iter().map(Zone::try_from).collect()
}

// ── Read ──

pub async fn find_all(pool: &PgPool) -> RepoResult<Vec<Zone>> {
    let sql = format!("SELECT {ZONE_COLUMNS} FROM zones ORDER BY id");
    let rows: Vec<ZoneRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    into_zones(rows)
}

/// `ST_Intersects` is boundary-inclusive and served by the GiST index.
pub async fn find_containing(pool: &PgPool, point: GeoPoint) -> RepoResult<Vec<Zone>> {
    let sql = format!(
        r#"
        SELECT {ZONE_COLUMNS}
        FROM zones
        WHERE ST_Intersects(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326))
        ORDER BY id
        "#
    );
    let rows: Vec<ZoneRow> = sqlx::query_as(&sql)
        .bind(point.lon())
        .bind(point.lat())
        .fetch_all(pool)
        .await?;
    into_zones(rows)
}

/// Great-circle search on `geography`, so the radius is in metres on the
/// spheroid rather than degrees.
pub async fn find_nearby(
    pool: &PgPool,
    point: GeoPoint,
    distance_km: f64,
    limit: usize,
) -> RepoResult<Vec<NearbyZone>> {
    let zones: Vec<NearbyZone> = sqlx::query_as(
        r#"
        SELECT id, name, designation,
               ST_Distance(geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography)
                   / 1000.0 AS distance_km
        FROM zones
        WHERE ST_DWithin(
            geom::geography,
            ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography,
            $3 * 1000.0
        )
        ORDER BY distance_km, id
        LIMIT $4
        "#,
    )
    .bind(point.lon())
    .bind(point.lat())
    .bind(distance_km)
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;
    Ok(zones)
}

pub async fn count(pool: &PgPool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM zones")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

// ── Import ──

/// Clear and reload the zone table in one transaction.
///
/// The table lock blocks concurrent writers; readers keep seeing the old
/// rows until commit. Each insert runs under its own savepoint so a row
/// refused by a constraint is counted and skipped.
pub async fn replace_all(pool: &PgPool, zones: &[NewZone]) -> RepoResult<ZoneLoadOutcome> {
    let mut tx = pool.begin().await?;

    sqlx::query("LOCK TABLE zones IN EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM zones").execute(&mut *tx).await?;

    let mut outcome = ZoneLoadOutcome::default();
    for zone in zones {
        let geojson = serde_json::to_string(&to_geojson(&zone.geometry))
            .map_err(|e| RepoError::Geometry(e.to_string()))?;

        let mut savepoint = sqlx::Connection::begin(&mut *tx).await?;
        let inserted = sqlx::query(
            r#"
            INSERT INTO zones (name, designation, geom, source)
            VALUES ($1, $2, ST_Multi(ST_SetSRID(ST_GeomFromGeoJSON($3), 4326)), $4)
            "#,
        )
        .bind(&zone.name)
        .bind(&zone.designation)
        .bind(&geojson)
        .bind(&zone.source)
        .execute(&mut *savepoint)
        .await;

        match inserted {
            Ok(_) => {
                savepoint.commit().await?;
                outcome.inserted += 1;
            }
            Err(sqlx::Error::Database(e)) => {
                tracing::warn!(zone = %zone.name, error = %e, "Zone rejected by store");
                savepoint.rollback().await?;
                outcome.rejected += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tx.commit().await?;
    Ok(outcome)
}
