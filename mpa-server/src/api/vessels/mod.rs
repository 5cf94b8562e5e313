//! Vessel API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/vessels", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/update", post(handler::update))
        .route("/{mmsi}", get(handler::get_by_mmsi))
        .route("/{mmsi}/inside", get(handler::inside))
}
