//! Containment Query Service
//!
//! Point and vessel membership against the current zone set. Stateless:
//! every answer depends only on store contents at call time.

use std::sync::Arc;

use shared::models::{
    GeoPoint, NearbyZones, PointContainment, StoreStats, Vessel, VesselContainment, VesselReport,
    Zone, validate_vessel_id,
};
use shared::{AppError, AppResult};

use crate::db::{VesselStore, ZoneStore};

/// Radius used by `find_nearby` when the caller gives none
pub const DEFAULT_NEARBY_KM: f64 = 10.0;
/// Largest accepted search radius
pub const MAX_NEARBY_KM: f64 = 1000.0;
/// Zones returned by one radius search
pub const NEARBY_LIMIT: usize = 10;

#[derive(Clone)]
pub struct ContainmentService {
    zones: Arc<dyn ZoneStore>,
    vessels: Arc<dyn VesselStore>,
}

impl ContainmentService {
    pub fn new(zones: Arc<dyn ZoneStore>, vessels: Arc<dyn VesselStore>) -> Self {
        Self { zones, vessels }
    }

    /// Zones containing or touching the point. Coordinates are validated
    /// before any store access.
    pub async fn is_inside(&self, lat: f64, lon: f64) -> AppResult<PointContainment> {
        let point = GeoPoint::new(lat, lon)?;
        let zones = self.zones.find_containing(point).await?;
        let matched_zones: Vec<_> = zones.iter().map(Zone::to_ref).collect();

        Ok(PointContainment {
            lat,
            lon,
            inside: !matched_zones.is_empty(),
            matched_zones,
        })
    }

    /// Membership of the vessel's last stored position.
    pub async fn is_vessel_inside(&self, mmsi: &str) -> AppResult<VesselContainment> {
        let vessel = self.get_vessel(mmsi).await?;
        let point = GeoPoint::new(vessel.lat, vessel.lon)?;
        let zones = self.zones.find_containing(point).await?;
        let matched_zones: Vec<_> = zones.iter().map(Zone::to_ref).collect();

        tracing::debug!(mmsi = %vessel.mmsi, matches = matched_zones.len(), "Vessel containment");

        Ok(VesselContainment {
            mmsi: vessel.mmsi,
            last_lat: vessel.lat,
            last_lon: vessel.lon,
            inside: !matched_zones.is_empty(),
            matched_zones,
        })
    }

    /// Up to [`NEARBY_LIMIT`] zones within `distance_km` of the point,
    /// nearest first. Distances are rounded to metres.
    pub async fn find_nearby(
        &self,
        lat: f64,
        lon: f64,
        distance_km: Option<f64>,
    ) -> AppResult<NearbyZones> {
        let point = GeoPoint::new(lat, lon)?;
        let distance_km = distance_km.unwrap_or(DEFAULT_NEARBY_KM);
        if !distance_km.is_finite() {
            return Err(AppError::validation("distance_km must be a finite number")
                .with_detail("field", "distance_km"));
        }
        if !(0.0..=MAX_NEARBY_KM).contains(&distance_km) {
            return Err(AppError::out_of_range(
                "distance_km",
                distance_km,
                0.0,
                MAX_NEARBY_KM,
            ));
        }

        let mut zones_nearby = self
            .zones
            .find_nearby(point, distance_km, NEARBY_LIMIT)
            .await?;
        for zone in &mut zones_nearby {
            zone.distance_km = (zone.distance_km * 1000.0).round() / 1000.0;
        }

        Ok(NearbyZones {
            lat,
            lon,
            distance_km,
            zones_nearby,
        })
    }

    pub async fn list_zones(&self) -> AppResult<Vec<Zone>> {
        Ok(self.zones.list_all().await?)
    }

    pub async fn upsert_vessel(&self, report: VesselReport) -> AppResult<Vessel> {
        let vessel = self.vessels.upsert(report).await?;
        tracing::debug!(mmsi = %vessel.mmsi, lat = vessel.lat, lon = vessel.lon, "Vessel position stored");
        Ok(vessel)
    }

    pub async fn get_vessel(&self, mmsi: &str) -> AppResult<Vessel> {
        let mmsi = validate_vessel_id(mmsi)?;
        self.vessels
            .get(mmsi)
            .await?
            .ok_or_else(|| AppError::vessel_not_found(mmsi))
    }

    pub async fn stats(&self) -> AppResult<StoreStats> {
        Ok(StoreStats {
            zone_count: self.zones.count().await?,
            vessel_count: self.vessels.count().await?,
            backend: self.zones.describe().await?,
        })
    }
}
