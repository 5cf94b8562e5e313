//! Diagnostics routes

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use shared::models::{NearbyZones, StoreStats};
use shared::{AppError, AppResult};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/debug/stats", get(stats))
        .route("/debug/nearby", get(nearby))
}

/// GET /debug/stats - zone and vessel counts, store backend
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<StoreStats>> {
    Ok(Json(state.service.stats().await?))
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub distance_km: Option<f64>,
}

/// GET /debug/nearby?lat=&lon=&distance_km= - nearest zones within the radius
pub async fn nearby(
    State(state): State<ServerState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> AppResult<Json<NearbyZones>> {
    let Query(query) = query.map_err(|e| AppError::invalid_request(e.body_text()))?;
    let lat = query.lat.ok_or_else(|| AppError::required("lat"))?;
    let lon = query.lon.ok_or_else(|| AppError::required("lon"))?;

    Ok(Json(
        state.service.find_nearby(lat, lon, query.distance_km).await?,
    ))
}
