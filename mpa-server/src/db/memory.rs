//! In-process store
//!
//! Zones live in an immutable snapshot (zone list + R-tree over bounding
//! boxes) behind a `parking_lot::RwLock`. `replace_all` builds the next
//! snapshot off-lock and swaps the `Arc`, so readers see either the old or
//! the new zone set. Vessels live in a `DashMap` keyed by MMSI.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use geo::{
    BoundingRect, Closest, Distance, Haversine, HaversineClosestPoint, Intersects, Validation,
};
use geo_types::{MultiPolygon, Point};
use parking_lot::RwLock;
use rstar::{AABB, RTree, RTreeObject};
use shared::models::{GeoPoint, NearbyZone, NewZone, Vessel, VesselReport, Zone};

use super::repository::{RepoResult, VesselStore, ZoneLoadOutcome, ZoneStore};

/// Lower bound for the length of one degree on the haversine sphere
const KM_PER_DEGREE_MIN: f64 = 110.5;

/// Bounding box of the zone at `slot` in the snapshot
#[derive(Debug, Clone)]
struct ZoneEnvelope {
    slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for ZoneEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

#[derive(Default)]
struct ZoneSnapshot {
    /// Ordered by id
    zones: Vec<Zone>,
    index: RTree<ZoneEnvelope>,
}

impl ZoneSnapshot {
    fn build(zones: Vec<Zone>) -> Self {
        let envelopes = zones
            .iter()
            .enumerate()
            .filter_map(|(slot, zone)| {
                let rect = zone.geometry.bounding_rect()?;
                Some(ZoneEnvelope {
                    slot,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();
        Self {
            zones,
            index: RTree::bulk_load(envelopes),
        }
    }

    fn containing(&self, point: GeoPoint) -> Vec<Zone> {
        let target: Point<f64> = point.into();
        let mut slots: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&AABB::from_point([point.lon(), point.lat()]))
            .map(|candidate| candidate.slot)
            .filter(|&slot| self.zones[slot].geometry.intersects(&target))
            .collect();
        slots.sort_unstable();
        slots.into_iter().map(|slot| self.zones[slot].clone()).collect()
    }

    fn nearby(&self, point: GeoPoint, distance_km: f64, limit: usize) -> Vec<NearbyZone> {
        let target: Point<f64> = point.into();
        let radius_m = distance_km * 1000.0;
        let mut found: Vec<NearbyZone> = self
            .index
            .locate_in_envelope_intersecting(&search_envelope(point, distance_km))
            .filter_map(|candidate| {
                let zone = &self.zones[candidate.slot];
                let distance_m = distance_to_zone_m(&zone.geometry, target)?;
                (distance_m <= radius_m).then(|| NearbyZone {
                    id: zone.id,
                    name: zone.name.clone(),
                    designation: zone.designation.clone(),
                    distance_km: distance_m / 1000.0,
                })
            })
            .collect();
        found.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then(a.id.cmp(&b.id))
        });
        found.truncate(limit);
        found
    }
}

/// Great-circle distance in metres from the point to the nearest part of
/// the zone; 0 inside. `None` when no single nearest point exists.
fn distance_to_zone_m(geometry: &MultiPolygon<f64>, target: Point<f64>) -> Option<f64> {
    match geometry.haversine_closest_point(&target) {
        Closest::Intersection(_) => Some(0.0),
        Closest::SinglePoint(nearest) => Some(Haversine.distance(nearest, target)),
        Closest::Indeterminate => None,
    }
}

/// Lon/lat box holding every point within `distance_km` of `point`.
/// Does not wrap at the antimeridian.
fn search_envelope(point: GeoPoint, distance_km: f64) -> AABB<[f64; 2]> {
    let dlat = distance_km / KM_PER_DEGREE_MIN;
    let poleward = (point.lat().abs() + dlat).min(90.0).to_radians().cos();
    let dlon = if poleward > 1e-6 {
        (distance_km / (KM_PER_DEGREE_MIN * poleward)).min(360.0)
    } else {
        360.0
    };
    AABB::from_corners(
        [point.lon() - dlon, point.lat() - dlat],
        [point.lon() + dlon, point.lat() + dlat],
    )
}

/// Zone and vessel store held in process memory
pub struct MemoryStore {
    zones: RwLock<Arc<ZoneSnapshot>>,
    vessels: DashMap<String, Vessel>,
    next_zone_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            zones: RwLock::new(Arc::new(ZoneSnapshot::default())),
            vessels: DashMap::new(),
            next_zone_id: AtomicI64::new(1),
        }
    }

    fn snapshot(&self) -> Arc<ZoneSnapshot> {
        self.zones.read().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ZoneStore for MemoryStore {
    async fn list_all(&self) -> RepoResult<Vec<Zone>> {
        Ok(self.snapshot().zones.clone())
    }

    async fn find_containing(&self, point: GeoPoint) -> RepoResult<Vec<Zone>> {
        Ok(self.snapshot().containing(point))
    }

    async fn find_nearby(
        &self,
        point: GeoPoint,
        distance_km: f64,
        limit: usize,
    ) -> RepoResult<Vec<NearbyZone>> {
        Ok(self.snapshot().nearby(point, distance_km, limit))
    }

    async fn replace_all(&self, zones: Vec<NewZone>) -> RepoResult<ZoneLoadOutcome> {
        let now = Utc::now();
        let mut outcome = ZoneLoadOutcome::default();
        let mut stored = Vec::with_capacity(zones.len());

        for zone in zones {
            // Same guard as the PostGIS CHECK (ST_IsValid(geom))
            if zone.geometry.0.is_empty() || !zone.geometry.is_valid() {
                tracing::warn!(zone = %zone.name, "Zone rejected by store");
                outcome.rejected += 1;
                continue;
            }
            stored.push(Zone {
                id: self.next_zone_id.fetch_add(1, Ordering::Relaxed),
                name: zone.name,
                designation: zone.designation,
                geometry: zone.geometry,
                source: zone.source,
                created_at: now,
            });
            outcome.inserted += 1;
        }

        let snapshot = Arc::new(ZoneSnapshot::build(stored));
        *self.zones.write() = snapshot;
        Ok(outcome)
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.snapshot().zones.len() as i64)
    }

    async fn describe(&self) -> RepoResult<String> {
        Ok("memory".to_string())
    }
}

#[async_trait]
impl VesselStore for MemoryStore {
    async fn upsert(&self, report: VesselReport) -> RepoResult<Vessel> {
        let now = Utc::now();
        let vessel = match self.vessels.entry(report.mmsi.clone()) {
            Entry::Occupied(mut entry) => {
                let vessel = entry.get_mut();
                vessel.lat = report.position.lat();
                vessel.lon = report.position.lon();
                vessel.updated_at = now;
                if report.name.is_some() {
                    vessel.name = report.name;
                }
                vessel.clone()
            }
            Entry::Vacant(entry) => {
                let vessel = Vessel {
                    mmsi: report.mmsi,
                    name: report.name,
                    lat: report.position.lat(),
                    lon: report.position.lon(),
                    updated_at: now,
                };
                entry.insert(vessel.clone());
                vessel
            }
        };
        Ok(vessel)
    }

    async fn get(&self, mmsi: &str) -> RepoResult<Option<Vessel>> {
        Ok(self.vessels.get(mmsi).map(|v| v.value().clone()))
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.vessels.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Rect, polygon};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn rect_zone(name: &str, min: (f64, f64), max: (f64, f64)) -> NewZone {
        NewZone {
            name: name.to_string(),
            designation: Some("SMR".to_string()),
            geometry: MultiPolygon::new(vec![Rect::new(min, max).to_polygon()]),
            source: Some("test".to_string()),
        }
    }

    fn report(mmsi: &str, name: Option<&str>, lat: f64, lon: f64) -> VesselReport {
        VesselReport {
            mmsi: mmsi.to_string(),
            name: name.map(str::to_string),
            position: GeoPoint::new(lat, lon).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_find_containing_includes_boundary() {
        let store = MemoryStore::new();
        store
            .replace_all(vec![rect_zone("Lovers Point", (-122.0, 36.0), (-121.9, 37.0))])
            .await
            .unwrap();

        let inside = GeoPoint::new(36.52, -121.95).unwrap();
        assert_eq!(store.find_containing(inside).await.unwrap().len(), 1);

        let on_edge = GeoPoint::new(36.5, -122.0).unwrap();
        assert_eq!(store.find_containing(on_edge).await.unwrap().len(), 1);

        let on_vertex = GeoPoint::new(37.0, -121.9).unwrap();
        assert_eq!(store.find_containing(on_vertex).await.unwrap().len(), 1);

        let outside = GeoPoint::new(37.8, -122.4).unwrap();
        assert!(store.find_containing(outside).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_zones_all_match_in_id_order() {
        let store = MemoryStore::new();
        store
            .replace_all(vec![
                rect_zone("Outer", (-123.0, 36.0), (-121.0, 38.0)),
                rect_zone("Inner", (-122.5, 36.5), (-121.5, 37.5)),
                rect_zone("Elsewhere", (-120.0, 30.0), (-119.0, 31.0)),
            ])
            .await
            .unwrap();

        let matches = store
            .find_containing(GeoPoint::new(37.0, -122.0).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = matches.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, ["Outer", "Inner"]);
        assert!(matches[0].id < matches[1].id);
    }

    #[tokio::test]
    async fn test_index_agrees_with_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x4d5041);
        let zones: Vec<NewZone> = (0..40)
            .map(|i| {
                let x = rng.gen_range(-123.0..-121.5);
                let y = rng.gen_range(35.5..37.5);
                let w = rng.gen_range(0.05..0.8);
                let h = rng.gen_range(0.05..0.8);
                rect_zone(&format!("zone-{i}"), (x, y), (x + w, y + h))
            })
            .collect();
        let geometries: Vec<MultiPolygon<f64>> = zones.iter().map(|z| z.geometry.clone()).collect();

        let store = MemoryStore::new();
        store.replace_all(zones).await.unwrap();
        let stored = store.list_all().await.unwrap();

        for _ in 0..2000 {
            let lat = rng.gen_range(35.0..38.5);
            let lon = rng.gen_range(-123.5..-120.5);
            let point = GeoPoint::new(lat, lon).unwrap();
            let target: Point<f64> = point.into();

            let expected: Vec<i64> = stored
                .iter()
                .zip(&geometries)
                .filter(|(_, g)| g.intersects(&target))
                .map(|(z, _)| z.id)
                .collect();
            let found: Vec<i64> = store
                .find_containing(point)
                .await
                .unwrap()
                .iter()
                .map(|z| z.id)
                .collect();
            assert_eq!(found, expected, "mismatch at ({lat}, {lon})");
        }
    }

    #[tokio::test]
    async fn test_find_nearby_orders_by_distance() {
        let store = MemoryStore::new();
        store
            .replace_all(vec![
                rect_zone("Far", (-119.0, 34.0), (-118.9, 34.1)),
                rect_zone("Near", (-121.8, 36.4), (-121.7, 36.6)),
                rect_zone("Under", (-122.0, 36.0), (-121.9, 37.0)),
            ])
            .await
            .unwrap();
        let point = GeoPoint::new(36.5, -121.95).unwrap();

        let nearby = store.find_nearby(point, 25.0, 10).await.unwrap();
        let names: Vec<_> = nearby.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, ["Under", "Near"]);
        assert_eq!(nearby[0].distance_km, 0.0);
        // 0.15 degrees of longitude at 36.5 N
        assert!((nearby[1].distance_km - 13.41).abs() < 0.05, "{}", nearby[1].distance_km);

        let closest = store.find_nearby(point, 25.0, 1).await.unwrap();
        assert_eq!(closest.len(), 1);
        assert_eq!(closest[0].name, "Under");

        let only_containing = store.find_nearby(point, 0.0, 10).await.unwrap();
        assert_eq!(only_containing.len(), 1);
    }

    #[tokio::test]
    async fn test_find_nearby_agrees_with_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x6e656172);
        let zones: Vec<NewZone> = (0..30)
            .map(|i| {
                let x = rng.gen_range(-124.0..-120.0);
                let y = rng.gen_range(33.0..38.0);
                let w = rng.gen_range(0.02..0.3);
                let h = rng.gen_range(0.02..0.3);
                rect_zone(&format!("zone-{i}"), (x, y), (x + w, y + h))
            })
            .collect();

        let store = MemoryStore::new();
        store.replace_all(zones).await.unwrap();
        let stored = store.list_all().await.unwrap();

        for _ in 0..200 {
            let point = GeoPoint::new(rng.gen_range(32.5..38.5), rng.gen_range(-124.5..-119.5))
                .unwrap();
            let radius_km = rng.gen_range(1.0..80.0);
            let target: Point<f64> = point.into();

            let mut expected: Vec<i64> = stored
                .iter()
                .filter(|z| {
                    distance_to_zone_m(&z.geometry, target)
                        .is_some_and(|d| d <= radius_km * 1000.0)
                })
                .map(|z| z.id)
                .collect();
            expected.sort_unstable();

            let mut found: Vec<i64> = store
                .find_nearby(point, radius_km, usize::MAX)
                .await
                .unwrap()
                .iter()
                .map(|z| z.id)
                .collect();
            found.sort_unstable();
            assert_eq!(found, expected, "mismatch at {point:?} within {radius_km} km");
        }
    }

    #[tokio::test]
    async fn test_replace_all_swaps_zone_set() {
        let store = MemoryStore::new();
        store
            .replace_all(vec![rect_zone("A", (0.0, 0.0), (1.0, 1.0))])
            .await
            .unwrap();
        let outcome = store
            .replace_all(vec![
                rect_zone("B", (2.0, 2.0), (3.0, 3.0)),
                rect_zone("C", (4.0, 4.0), (5.0, 5.0)),
            ])
            .await
            .unwrap();

        assert_eq!(outcome.inserted, 2);
        assert_eq!(ZoneStore::count(&store).await.unwrap(), 2);
        let point = GeoPoint::new(0.5, 0.5).unwrap();
        assert!(store.find_containing(point).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_all_rejects_invalid_geometry() {
        let store = MemoryStore::new();
        let bowtie = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
        ];
        let outcome = store
            .replace_all(vec![
                rect_zone("Good", (0.0, 0.0), (1.0, 1.0)),
                NewZone {
                    name: "Bowtie".to_string(),
                    designation: None,
                    geometry: MultiPolygon::new(vec![bowtie]),
                    source: None,
                },
            ])
            .await
            .unwrap();
        assert_eq!(outcome, ZoneLoadOutcome { inserted: 1, rejected: 1 });
        assert_eq!(ZoneStore::count(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_then_get_round_trips() {
        let store = MemoryStore::new();
        let written = store
            .upsert(report("123456789", Some("Sea Otter"), 36.52, -121.95))
            .await
            .unwrap();
        let read = store.get("123456789").await.unwrap().unwrap();
        assert_eq!(read, written);
        assert_eq!(read.lat, 36.52);
        assert_eq!(read.lon, -121.95);
        assert_eq!(read.name.as_deref(), Some("Sea Otter"));
    }

    #[tokio::test]
    async fn test_second_upsert_overwrites_in_place() {
        let store = MemoryStore::new();
        store
            .upsert(report("123456789", Some("Sea Otter"), 36.52, -121.95))
            .await
            .unwrap();
        store
            .upsert(report("123456789", None, 36.60, -121.90))
            .await
            .unwrap();

        assert_eq!(VesselStore::count(&store).await.unwrap(), 1);
        let vessel = store.get("123456789").await.unwrap().unwrap();
        assert_eq!((vessel.lat, vessel.lon), (36.60, -121.90));
        // omitted name keeps the stored one
        assert_eq!(vessel.name.as_deref(), Some("Sea Otter"));
    }

    #[tokio::test]
    async fn test_get_unknown_vessel() {
        let store = MemoryStore::new();
        assert!(store.get("000000000").await.unwrap().is_none());
    }
}
