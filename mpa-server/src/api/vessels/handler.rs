//! Vessel API Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use shared::models::{Vessel, VesselContainment, VesselUpdate};
use shared::{AppError, AppResult};

use crate::core::ServerState;

/// POST /vessels/update - store a position report
pub async fn update(
    State(state): State<ServerState>,
    payload: Result<Json<VesselUpdate>, JsonRejection>,
) -> AppResult<Json<Vessel>> {
    let Json(payload) = payload.map_err(|e| AppError::invalid_request(e.body_text()))?;
    let report = payload.validate()?;
    Ok(Json(state.service.upsert_vessel(report).await?))
}

/// GET /vessels/{mmsi} - last known position
pub async fn get_by_mmsi(
    State(state): State<ServerState>,
    Path(mmsi): Path<String>,
) -> AppResult<Json<Vessel>> {
    Ok(Json(state.service.get_vessel(&mmsi).await?))
}

/// GET /vessels/{mmsi}/inside - zones containing the vessel's last position
pub async fn inside(
    State(state): State<ServerState>,
    Path(mmsi): Path<String>,
) -> AppResult<Json<VesselContainment>> {
    Ok(Json(state.service.is_vessel_inside(&mmsi).await?))
}
