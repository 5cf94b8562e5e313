//! Point containment handlers

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use shared::models::PointContainment;
use shared::{AppError, AppResult};

use crate::core::ServerState;

#[derive(Debug, Deserialize)]
pub struct InsideQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// GET /inside?lat=&lon= - zones containing the point (boundary counts as inside)
pub async fn inside(
    State(state): State<ServerState>,
    query: Result<Query<InsideQuery>, QueryRejection>,
) -> AppResult<Json<PointContainment>> {
    let Query(query) = query.map_err(|e| AppError::invalid_request(e.body_text()))?;
    let lat = query.lat.ok_or_else(|| AppError::required("lat"))?;
    let lon = query.lon.ok_or_else(|| AppError::required("lon"))?;

    Ok(Json(state.service.is_inside(lat, lon).await?))
}
