//! Geometry Normalizer
//!
//! Turns an untrusted GeoJSON geometry into a valid WGS 84 multi-polygon.
//!
//! # Steps
//!
//! 1. Reject non-polygonal and empty geometries
//! 2. Reject non-finite or out-of-range coordinates
//! 3. Close open rings (counted as a repair)
//! 4. Merge everything into one `MultiPolygon`
//! 5. Validate topology with [`geo::Validation`]
//! 6. Repair invalid input with a boolean-overlay union of its members
//!
//! The function is pure: callers decide what to log and count.

use geo::{BooleanOps, Validation};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Position, Value};
use shared::models::{LAT_RANGE, LON_RANGE};
use thiserror::Error;

/// Why a geometry was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryDefect {
    #[error("unsupported geometry type: {0}")]
    UnsupportedType(&'static str),

    #[error("geometry is empty")]
    Empty,

    #[error("coordinate is not a finite number")]
    NonFiniteCoordinate,

    #[error("coordinate ({lon}, {lat}) is outside WGS 84 bounds")]
    CoordinateOutOfRange { lon: f64, lat: f64 },

    #[error("geometry could not be repaired: {0}")]
    Unrepairable(String),
}

/// A valid multi-polygon ready for storage
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGeometry {
    pub geometry: MultiPolygon<f64>,
    /// True when the input needed closing or topological repair
    pub repaired: bool,
}

/// Normalize one feature geometry.
pub fn normalize(geometry: &geojson::Geometry) -> Result<NormalizedGeometry, GeometryDefect> {
    normalize_value(&geometry.value)
}

/// Normalize a bare GeoJSON geometry value.
pub fn normalize_value(value: &Value) -> Result<NormalizedGeometry, GeometryDefect> {
    let mut raw_polygons = Vec::new();
    collect_polygons(value, &mut raw_polygons)?;

    let mut closed_rings = true;
    let mut polygons = Vec::with_capacity(raw_polygons.len());
    for rings in raw_polygons {
        for ring in rings {
            closed_rings &= check_ring(ring)?;
        }
        if let Some(polygon) = to_polygon(rings) {
            polygons.push(polygon);
        }
    }
    if polygons.is_empty() {
        return Err(GeometryDefect::Empty);
    }

    let geometry = MultiPolygon::new(polygons);
    match geometry.check_validation() {
        Ok(()) => Ok(NormalizedGeometry {
            geometry,
            repaired: !closed_rings,
        }),
        Err(problem) => {
            let repaired = repair(&geometry);
            if repaired.0.is_empty() {
                return Err(GeometryDefect::Unrepairable(format!(
                    "{problem}; nothing left after repair"
                )));
            }
            repaired
                .check_validation()
                .map_err(|e| GeometryDefect::Unrepairable(e.to_string()))?;
            Ok(NormalizedGeometry {
                geometry: repaired,
                repaired: true,
            })
        }
    }
}

/// Rebuild a multi-polygon as the union of its members.
///
/// Each member is resolved on its own (self-intersections split, zero-area
/// rings dropped) and overlapping members are dissolved into one area.
pub fn repair(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    geometry
        .0
        .iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, polygon| {
            acc.union(polygon)
        })
}

fn collect_polygons<'a>(
    value: &'a Value,
    out: &mut Vec<&'a [Vec<Position>]>,
) -> Result<(), GeometryDefect> {
    match value {
        Value::Polygon(rings) => out.push(rings.as_slice()),
        Value::MultiPolygon(polygons) => out.extend(polygons.iter().map(Vec::as_slice)),
        Value::GeometryCollection(members) => {
            if members.is_empty() {
                return Err(GeometryDefect::Empty);
            }
            let mut polygonal = false;
            for member in members {
                if matches!(
                    member.value,
                    Value::Polygon(_) | Value::MultiPolygon(_) | Value::GeometryCollection(_)
                ) {
                    polygonal = true;
                    collect_polygons(&member.value, out)?;
                }
            }
            if !polygonal {
                return Err(GeometryDefect::UnsupportedType("GeometryCollection"));
            }
        }
        other => return Err(GeometryDefect::UnsupportedType(type_name(other))),
    }
    Ok(())
}

/// Check every position of a ring; returns whether the ring is closed.
fn check_ring(ring: &[Position]) -> Result<bool, GeometryDefect> {
    for position in ring {
        let (lon, lat) = match position.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            _ => {
                return Err(GeometryDefect::Unrepairable(
                    "position without longitude and latitude".into(),
                ));
            }
        };
        if !lon.is_finite() || !lat.is_finite() {
            return Err(GeometryDefect::NonFiniteCoordinate);
        }
        if !(LON_RANGE.0..=LON_RANGE.1).contains(&lon) || !(LAT_RANGE.0..=LAT_RANGE.1).contains(&lat)
        {
            return Err(GeometryDefect::CoordinateOutOfRange { lon, lat });
        }
    }
    Ok(ring.is_empty() || ring.first() == ring.last())
}

/// `Polygon::new` closes open rings. Empty rings are dropped.
fn to_polygon(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    if exterior.is_empty() {
        return None;
    }
    let interiors = interiors
        .iter()
        .filter(|ring| !ring.is_empty())
        .map(|ring| to_line_string(ring))
        .collect();
    Some(Polygon::new(to_line_string(exterior), interiors))
}

fn to_line_string(ring: &[Position]) -> LineString<f64> {
    ring.iter()
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect::<Vec<_>>()
        .into()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn ring(points: &[(f64, f64)]) -> Vec<Position> {
        points.iter().map(|&(x, y)| vec![x, y]).collect()
    }

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Position> {
        ring(&[
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ])
    }

    #[test]
    fn test_valid_polygon_passes_untouched() {
        let value = Value::Polygon(vec![square(-122.0, 36.0, 0.1)]);
        let result = normalize_value(&value).unwrap();
        assert!(!result.repaired);
        assert_eq!(result.geometry.0.len(), 1);
        assert!(result.geometry.is_valid());
    }

    #[test]
    fn test_unclosed_ring_is_closed() {
        let open = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let result = normalize_value(&Value::Polygon(vec![open])).unwrap();
        assert!(result.repaired);
        let exterior = result.geometry.0[0].exterior();
        assert_eq!(exterior.0.first(), exterior.0.last());
        assert!((result.geometry.unsigned_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_self_intersecting_ring_is_repaired() {
        // bowtie: two unit triangles crossing at (1, 1)
        let bowtie = ring(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0), (0.0, 0.0)]);
        let result = normalize_value(&Value::Polygon(vec![bowtie])).unwrap();
        assert!(result.repaired);
        assert!(result.geometry.is_valid());
        assert!((result.geometry.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlapping_members_are_dissolved() {
        let value = Value::MultiPolygon(vec![
            vec![square(0.0, 0.0, 2.0)],
            vec![square(1.0, 0.0, 2.0)],
        ]);
        let result = normalize_value(&value).unwrap();
        assert!(result.repaired);
        assert!(result.geometry.is_valid());
        // 2x2 + 2x2 with a 1x2 overlap
        assert!((result.geometry.unsigned_area() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_members_stay_separate() {
        let value = Value::MultiPolygon(vec![
            vec![square(0.0, 0.0, 1.0)],
            vec![square(5.0, 5.0, 1.0)],
        ]);
        let result = normalize_value(&value).unwrap();
        assert!(!result.repaired);
        assert_eq!(result.geometry.0.len(), 2);
    }

    #[test]
    fn test_polygon_with_hole() {
        let value = Value::Polygon(vec![square(0.0, 0.0, 4.0), square(1.0, 1.0, 1.0)]);
        let result = normalize_value(&value).unwrap();
        assert!(!result.repaired);
        assert!((result.geometry.unsigned_area() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_collection_members_are_merged() {
        let member = |rings| geojson::Geometry::new(Value::Polygon(rings));
        let value = Value::GeometryCollection(vec![
            member(vec![square(0.0, 0.0, 1.0)]),
            geojson::Geometry::new(Value::Point(vec![0.5, 0.5])),
            member(vec![square(3.0, 3.0, 1.0)]),
        ]);
        let result = normalize_value(&value).unwrap();
        assert_eq!(result.geometry.0.len(), 2);
    }

    #[test]
    fn test_rejects_non_polygonal() {
        let point = Value::Point(vec![-121.95, 36.52]);
        assert_eq!(
            normalize_value(&point),
            Err(GeometryDefect::UnsupportedType("Point"))
        );

        let line = Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
        assert_eq!(
            normalize_value(&line),
            Err(GeometryDefect::UnsupportedType("LineString"))
        );

        let points_only = Value::GeometryCollection(vec![geojson::Geometry::new(point)]);
        assert_eq!(
            normalize_value(&points_only),
            Err(GeometryDefect::UnsupportedType("GeometryCollection"))
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            normalize_value(&Value::MultiPolygon(vec![])),
            Err(GeometryDefect::Empty)
        );
        assert_eq!(
            normalize_value(&Value::Polygon(vec![])),
            Err(GeometryDefect::Empty)
        );
        assert_eq!(
            normalize_value(&Value::GeometryCollection(vec![])),
            Err(GeometryDefect::Empty)
        );
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        let value = Value::Polygon(vec![square(179.5, 0.0, 1.0)]);
        assert!(matches!(
            normalize_value(&value),
            Err(GeometryDefect::CoordinateOutOfRange { .. })
        ));

        let mut positions = square(0.0, 0.0, 1.0);
        positions[1] = vec![f64::NAN, 0.0];
        assert_eq!(
            normalize_value(&Value::Polygon(vec![positions])),
            Err(GeometryDefect::NonFiniteCoordinate)
        );
    }

    #[test]
    fn test_collapsed_ring_is_unrepairable() {
        let flat = ring(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(matches!(
            normalize_value(&Value::Polygon(vec![flat])),
            Err(GeometryDefect::Unrepairable(_))
        ));
    }
}
