//! import-zones - load the MPA zone dataset into the zone store
//!
//! Replaces all stored zones in one transaction. Exits non-zero when the
//! dataset cannot be fetched or parsed, or the load fails.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mpa_server::{Config, ImportPipeline, PgStore, setup_environment};

#[derive(Parser)]
#[command(name = "import-zones")]
#[command(about = "Import Marine Protected Area boundaries into PostGIS", long_about = None)]
struct Args {
    /// GeoJSON URL or local file (defaults to ZONES_SOURCE, then the CDFW dataset)
    source: Option<String>,

    /// Provenance label stored with each zone
    #[arg(long, env = "ZONES_SOURCE_LABEL")]
    source_label: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    let config = Config::from_env()?;
    let _log_guard = setup_environment(&config);

    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to import zones")?;
    let store = Arc::new(PgStore::connect(database_url, config.db_max_connections).await?);

    let source = args.source.unwrap_or_else(|| config.zones_source.clone());
    let label = args
        .source_label
        .unwrap_or_else(|| config.zones_source_label.clone());

    let pipeline = ImportPipeline::new(store, config.fetch_timeout())?;
    let report = pipeline
        .run(&source, &label)
        .await
        .with_context(|| format!("import from {source} failed"))?;

    println!(
        "Done. Imported: {}, repaired: {}, skipped: {} (no geometry {}, no name {}, invalid geometry {}, rejected by store {}), zones {} -> {} in {:.1}s",
        report.imported,
        report.repaired,
        report.skipped.total(),
        report.skipped.missing_geometry,
        report.skipped.missing_name,
        report.skipped.invalid_geometry,
        report.skipped.rejected_by_store,
        report.zones_before,
        report.zones_after,
        report.elapsed.as_secs_f64(),
    );

    Ok(())
}
