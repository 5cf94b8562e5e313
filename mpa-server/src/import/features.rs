//! FeatureCollection parsing and per-feature extraction
//!
//! The document is checked as a whole (type, crs); features are decoded one
//! at a time so a single malformed feature is skipped instead of failing the
//! run.

use geojson::Feature;
use serde_json::{Map, Value};

use super::ImportError;

/// Property keys holding the zone name, in priority order
pub const NAME_KEYS: [&str; 3] = ["NAME", "MPA_name", "name"];

/// Property keys holding the designation, in priority order
pub const DESIGNATION_KEYS: [&str; 4] = ["DESIG", "MPA_designation", "designation", "Type"];

/// CRS names equivalent to WGS 84 lon/lat
const WGS84_CRS_NAMES: [&str; 5] = [
    "urn:ogc:def:crs:OGC:1.3:CRS84",
    "urn:ogc:def:crs:OGC::CRS84",
    "urn:ogc:def:crs:EPSG::4326",
    "EPSG:4326",
    "CRS84",
];

/// A feature that carries everything a zone needs
#[derive(Debug, Clone)]
pub struct ZoneCandidate {
    pub index: usize,
    pub name: String,
    pub designation: Option<String>,
    pub geometry: geojson::Geometry,
}

/// Outcome of looking at one feature
#[derive(Debug)]
pub enum Extraction {
    Candidate(ZoneCandidate),
    MissingGeometry,
    MissingName,
    Malformed(String),
}

/// Decode a GeoJSON FeatureCollection into its raw features.
pub fn parse_feature_collection(bytes: &[u8]) -> Result<Vec<Value>, ImportError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| ImportError::Parse(format!("invalid JSON: {e}")))?;
    let Value::Object(mut object) = document else {
        return Err(ImportError::Parse("document is not a JSON object".into()));
    };

    match object.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(ImportError::Parse(format!(
                "expected a FeatureCollection, found {other}"
            )));
        }
        None => return Err(ImportError::Parse("missing GeoJSON type".into())),
    }

    check_crs(object.get("crs"))?;

    match object.remove("features") {
        Some(Value::Array(features)) => Ok(features),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(ImportError::Parse("features is not an array".into())),
    }
}

/// Reject a declared CRS other than WGS 84. No `crs` member means WGS 84.
fn check_crs(crs: Option<&Value>) -> Result<(), ImportError> {
    let Some(crs) = crs.filter(|c| !c.is_null()) else {
        return Ok(());
    };
    let name = crs
        .pointer("/properties/name")
        .and_then(Value::as_str)
        .ok_or_else(|| ImportError::UnsupportedCrs(crs.to_string()))?;

    if WGS84_CRS_NAMES.iter().any(|known| known.eq_ignore_ascii_case(name)) {
        Ok(())
    } else {
        Err(ImportError::UnsupportedCrs(name.to_string()))
    }
}

/// Pull name, designation and geometry out of one raw feature.
pub fn extract(index: usize, raw: Value) -> Extraction {
    let feature: Feature = match serde_json::from_value(raw) {
        Ok(feature) => feature,
        Err(e) => return Extraction::Malformed(e.to_string()),
    };

    let Some(geometry) = feature.geometry else {
        return Extraction::MissingGeometry;
    };
    let properties = feature.properties.unwrap_or_default();
    let Some(name) = first_text(&properties, &NAME_KEYS) else {
        return Extraction::MissingName;
    };

    Extraction::Candidate(ZoneCandidate {
        index,
        name,
        designation: first_text(&properties, &DESIGNATION_KEYS),
        geometry,
    })
}

/// First non-empty value among `keys`, trimmed. Numbers are accepted as text.
fn first_text(properties: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let text = match properties.get(*key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    })
}
