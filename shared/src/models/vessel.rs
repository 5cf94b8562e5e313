//! Vessel Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::GeoPoint;
use crate::error::{AppError, AppResult, ErrorCode};

/// Longest accepted vessel identifier (MMSI is 9 digits; test and
/// synthetic feeds use longer identifiers)
pub const MAX_VESSEL_ID_LEN: usize = 64;

/// Longest accepted vessel display name
pub const MAX_VESSEL_NAME_LEN: usize = 200;

/// Vessel with its last known position (one record per MMSI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Vessel {
    pub mmsi: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub updated_at: DateTime<Utc>,
}

/// Position report payload (POST /vessels/update)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselUpdate {
    pub mmsi: String,
    #[serde(default)]
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

/// A position report that passed boundary validation
#[derive(Debug, Clone, PartialEq)]
pub struct VesselReport {
    pub mmsi: String,
    pub name: Option<String>,
    pub position: GeoPoint,
}

impl VesselUpdate {
    /// Validate the payload before it reaches a store.
    ///
    /// Blank names count as absent so they never clobber a stored name.
    pub fn validate(self) -> AppResult<VesselReport> {
        let mmsi = validate_vessel_id(&self.mmsi)?.to_string();
        let position = GeoPoint::new(self.lat, self.lon)?;

        let name = match self.name.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(n) if n.chars().count() > MAX_VESSEL_NAME_LEN => {
                return Err(AppError::validation(format!(
                    "name is too long (max {MAX_VESSEL_NAME_LEN} chars)"
                ))
                .with_detail("field", "name"));
            }
            Some(n) => Some(n.to_string()),
        };

        Ok(VesselReport {
            mmsi,
            name,
            position,
        })
    }
}

/// Check a vessel identifier and return it trimmed.
pub fn validate_vessel_id(mmsi: &str) -> AppResult<&str> {
    let mmsi = mmsi.trim();
    if mmsi.is_empty() {
        return Err(AppError::required("mmsi"));
    }
    if mmsi.chars().count() > MAX_VESSEL_ID_LEN || mmsi.chars().any(char::is_whitespace) {
        return Err(AppError::with_message(
            ErrorCode::VesselIdInvalid,
            format!("mmsi must be at most {MAX_VESSEL_ID_LEN} characters without whitespace"),
        )
        .with_detail("mmsi", mmsi));
    }
    Ok(mmsi)
}
