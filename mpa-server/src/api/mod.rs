//! HTTP API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | `/`, `/health` | GET | Liveness |
//! | `/zones` | GET | All zones (GeoJSON FeatureCollection) |
//! | `/inside?lat=&lon=` | GET | Point containment |
//! | `/vessels/update` | POST | Vessel position report |
//! | `/vessels/{mmsi}` | GET | Vessel last position |
//! | `/vessels/{mmsi}/inside` | GET | Vessel containment |
//! | `/debug/stats` | GET | Store counters |
//! | `/debug/nearby?lat=&lon=&distance_km=` | GET | Zones within a radius |
//!
//! Errors are `ApiResponse` bodies with the status derived from the error code.
//! Unknown paths answer 404 with code `NotFound`.

pub mod containment;
pub mod debug;
pub mod health;
pub mod vessels;
pub mod zones;

use axum::Router;
use http::Uri;
use shared::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(zones::router())
        .merge(containment::router())
        .merge(vessels::router())
        .merge(debug::router())
        .fallback(route_not_found)
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("Route {}", uri.path()))
}

/// Build the fully configured application
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
