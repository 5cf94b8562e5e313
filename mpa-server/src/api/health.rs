//! Health check routes
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | / | GET | Liveness |
//! | /health | GET | Liveness |

use axum::{Json, Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mpa-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
