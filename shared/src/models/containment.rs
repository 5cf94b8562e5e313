//! Containment query results

use serde::Serialize;

use super::zone::ZoneRef;

/// Result of a point-in-zone query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointContainment {
    pub lat: f64,
    pub lon: f64,
    pub inside: bool,
    pub matched_zones: Vec<ZoneRef>,
}

/// Result of a vessel-in-zone query, evaluated at the vessel's last position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselContainment {
    pub mmsi: String,
    pub last_lat: f64,
    pub last_lon: f64,
    pub inside: bool,
    pub matched_zones: Vec<ZoneRef>,
}

/// Store counters (GET /debug/stats)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub zone_count: i64,
    pub vessel_count: i64,
    /// Backend description, e.g. "postgis 3.4" or "memory"
    pub backend: String,
}

/// Zone within a search radius of a point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct NearbyZone {
    pub id: i64,
    pub name: String,
    pub designation: Option<String>,
    /// Distance from the point to the zone, 0 when the point is inside
    pub distance_km: f64,
}

/// Result of a radius search (GET /debug/nearby), nearest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyZones {
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
    pub zones_nearby: Vec<NearbyZone>,
}
