//! Zone API Handlers

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use geojson::{Feature, FeatureCollection, feature::Id};
use http::header;
use serde_json::{Map, json};
use shared::models::Zone;
use shared::{AppError, AppResult};

use crate::core::ServerState;
use crate::geometry::to_geojson;

const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";

/// GET /zones - all zones as a GeoJSON FeatureCollection (map rendering)
pub async fn list(State(state): State<ServerState>) -> AppResult<Response> {
    let zones = state.service.list_zones().await?;
    let collection = FeatureCollection {
        bbox: None,
        features: zones.iter().map(zone_feature).collect(),
        foreign_members: None,
    };
    let body = serde_json::to_string(&collection)
        .map_err(|e| AppError::internal(format!("Failed to encode zones: {e}")))?;

    Ok(([(header::CONTENT_TYPE, GEOJSON_CONTENT_TYPE)], body).into_response())
}

fn zone_feature(zone: &Zone) -> Feature {
    let mut properties = Map::new();
    properties.insert("id".into(), json!(zone.id));
    properties.insert("name".into(), json!(zone.name));
    properties.insert("designation".into(), json!(zone.designation));
    properties.insert("source".into(), json!(zone.source));

    Feature {
        bbox: None,
        geometry: Some(to_geojson(&zone.geometry)),
        id: Some(Id::Number(zone.id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}
