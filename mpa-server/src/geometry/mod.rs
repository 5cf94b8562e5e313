//! Zone geometry handling
//!
//! - [`normalize`] - validation and repair of untrusted polygons
//! - GeoJSON encoding for storage and API output

mod normalize;

pub use normalize::{GeometryDefect, NormalizedGeometry, normalize, normalize_value, repair};

use geo_types::MultiPolygon;

/// Encode a multi-polygon as a GeoJSON geometry object
pub fn to_geojson(geometry: &MultiPolygon<f64>) -> geojson::Geometry {
    geojson::Geometry::new(geojson::Value::from(geometry))
}

/// Decode a GeoJSON geometry document into a multi-polygon.
///
/// A single polygon is accepted and wrapped.
pub fn parse_multipolygon(text: &str) -> Result<MultiPolygon<f64>, String> {
    let geometry: geojson::Geometry = serde_json::from_str(text).map_err(|e| e.to_string())?;
    match geometry.value {
        geojson::Value::Polygon(_) => geo_types::Polygon::<f64>::try_from(geometry.value)
            .map(|polygon| MultiPolygon::new(vec![polygon]))
            .map_err(|e| e.to_string()),
        value => MultiPolygon::<f64>::try_from(value).map_err(|e| e.to_string()),
    }
}
