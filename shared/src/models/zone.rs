//! Zone Model

use chrono::{DateTime, Utc};
use geo_types::MultiPolygon;
use serde::Serialize;

/// Protected-area zone (a Marine Protected Area polygon with metadata)
///
/// Geometry is WGS 84 lon/lat and is always topologically valid: zones are
/// only built from normalized geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub id: i64,
    pub name: String,
    /// Protection level, e.g. "SMR" or "SMCA"
    pub designation: Option<String>,
    pub geometry: MultiPolygon<f64>,
    /// Provenance label of the dataset the zone was imported from
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Zone {
    pub fn to_ref(&self) -> ZoneRef {
        ZoneRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Import payload: a zone that has passed geometry normalization
#[derive(Debug, Clone, PartialEq)]
pub struct NewZone {
    pub name: String,
    pub designation: Option<String>,
    pub geometry: MultiPolygon<f64>,
    pub source: Option<String>,
}

/// Zone reference as listed in containment results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneRef {
    pub id: i64,
    pub name: String,
}
