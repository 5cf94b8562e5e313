//! Geographic Position Model

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Valid latitude range in degrees (WGS 84)
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);
/// Valid longitude range in degrees (WGS 84)
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);

/// A validated WGS 84 position.
///
/// Can only be built through [`GeoPoint::new`], so a `GeoPoint` that reaches a
/// store is always finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Validate a latitude/longitude pair.
    pub fn new(lat: f64, lon: f64) -> AppResult<Self> {
        check_coordinate("lat", lat, LAT_RANGE)?;
        check_coordinate("lon", lon, LON_RANGE)?;
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl From<GeoPoint> for geo_types::Point<f64> {
    /// x = longitude, y = latitude
    fn from(p: GeoPoint) -> Self {
        geo_types::Point::new(p.lon, p.lat)
    }
}

fn check_coordinate(field: &str, value: f64, (min, max): (f64, f64)) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!("{field} must be a finite number"))
            .with_detail("field", field));
    }
    if !(min..=max).contains(&value) {
        return Err(AppError::out_of_range(field, value, min, max));
    }
    Ok(())
}
