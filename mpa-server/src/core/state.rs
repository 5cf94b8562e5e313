//! Server state
//!
//! Picks the store backend from the configuration and wires it into the
//! containment service. Cloned into every handler.

use std::sync::Arc;

use shared::AppResult;

use crate::core::Config;
use crate::db::{MemoryStore, PgStore, VesselStore, ZoneStore};
use crate::import::ImportPipeline;
use crate::services::ContainmentService;

#[derive(Clone)]
pub struct ServerState {
    pub service: ContainmentService,
}

impl ServerState {
    /// Build state from configuration.
    ///
    /// `DATABASE_URL` selects PostGIS. Without it the in-memory store is
    /// used, optionally seeded from `ZONES_SEED_FILE`.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        if let Some(url) = &config.database_url {
            let store = Arc::new(PgStore::connect(url, config.db_max_connections).await?);
            return Ok(Self::with_stores(store.clone(), store));
        }

        tracing::warn!("DATABASE_URL not set, using in-memory store");
        let store = Arc::new(MemoryStore::new());

        if let Some(seed) = &config.zones_seed_file {
            let pipeline = ImportPipeline::new(store.clone(), config.fetch_timeout())?;
            let report = pipeline.run(seed, &config.zones_source_label).await?;
            tracing::info!(zones = report.imported, "Seeded in-memory zone store");
        }

        Ok(Self::with_stores(store.clone(), store))
    }

    pub fn with_stores(zones: Arc<dyn ZoneStore>, vessels: Arc<dyn VesselStore>) -> Self {
        Self {
            service: ContainmentService::new(zones, vessels),
        }
    }
}
