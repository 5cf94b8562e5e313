//! Import run orchestration

use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::models::NewZone;

use super::features::{Extraction, extract, parse_feature_collection};
use super::source::{DatasetSource, http_client};
use super::{ImportError, ImportReport, SkipCounts};
use crate::db::ZoneStore;
use crate::geometry::normalize;

/// Loads a zone dataset into a [`ZoneStore`]
pub struct ImportPipeline {
    zones: Arc<dyn ZoneStore>,
    client: reqwest::Client,
}

impl ImportPipeline {
    pub fn new(zones: Arc<dyn ZoneStore>, fetch_timeout: Duration) -> Result<Self, ImportError> {
        Ok(Self {
            zones,
            client: http_client(fetch_timeout)?,
        })
    }

    /// Replace the stored zone set with the dataset at `location`.
    ///
    /// `label` is stored as each zone's provenance; empty means none.
    pub async fn run(&self, location: &str, label: &str) -> Result<ImportReport, ImportError> {
        let started = Instant::now();
        let source = DatasetSource::parse(location);
        tracing::info!(source = %source, "Loading zone dataset");

        let bytes = source.fetch(&self.client).await?;
        let raw_features = parse_feature_collection(&bytes)?;
        let features = raw_features.len();
        tracing::info!(features, "Dataset parsed");

        let label = Some(label.trim()).filter(|l| !l.is_empty()).map(str::to_string);
        let mut skipped = SkipCounts::default();
        let mut repaired = 0;
        let mut zones = Vec::with_capacity(features);

        for (index, raw) in raw_features.into_iter().enumerate() {
            let candidate = match extract(index, raw) {
                Extraction::Candidate(candidate) => candidate,
                Extraction::MissingGeometry => {
                    tracing::debug!(feature = index, "Skipping feature without geometry");
                    skipped.missing_geometry += 1;
                    continue;
                }
                Extraction::MissingName => {
                    tracing::debug!(feature = index, "Skipping feature without name");
                    skipped.missing_name += 1;
                    continue;
                }
                Extraction::Malformed(reason) => {
                    tracing::warn!(feature = index, %reason, "Skipping malformed feature");
                    skipped.invalid_geometry += 1;
                    continue;
                }
            };

            match normalize(&candidate.geometry) {
                Ok(normalized) => {
                    if normalized.repaired {
                        tracing::debug!(
                            feature = candidate.index,
                            name = %candidate.name,
                            "Repaired geometry"
                        );
                        repaired += 1;
                    }
                    zones.push(NewZone {
                        name: candidate.name,
                        designation: candidate.designation,
                        geometry: normalized.geometry,
                        source: label.clone(),
                    });
                }
                Err(defect) => {
                    tracing::warn!(
                        feature = candidate.index,
                        name = %candidate.name,
                        %defect,
                        "Skipping feature with invalid geometry"
                    );
                    skipped.invalid_geometry += 1;
                }
            }
        }

        if zones.is_empty() {
            tracing::warn!(source = %source, "No usable zones in dataset; store will be emptied");
        }

        let zones_before = self.zones.count().await?;
        let outcome = self.zones.replace_all(zones).await?;
        skipped.rejected_by_store = outcome.rejected;
        let zones_after = self.zones.count().await?;

        let report = ImportReport {
            source: source.to_string(),
            features,
            imported: outcome.inserted,
            repaired,
            skipped,
            zones_before,
            zones_after,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            imported = report.imported,
            repaired = report.repaired,
            missing_geometry = skipped.missing_geometry,
            missing_name = skipped.missing_name,
            invalid_geometry = skipped.invalid_geometry,
            rejected_by_store = skipped.rejected_by_store,
            zones_before,
            zones_after,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Zone import finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use geo::{Area, Validation};
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dataset_file(document: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(document.to_string().as_bytes()).unwrap();
        file
    }

    fn feature(properties: serde_json::Value, geometry: serde_json::Value) -> serde_json::Value {
        json!({"type": "Feature", "properties": properties, "geometry": geometry})
    }

    fn monterey_rect() -> serde_json::Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[-122.0, 36.0], [-121.9, 36.0], [-121.9, 37.0], [-122.0, 37.0], [-122.0, 36.0]]]
        })
    }

    fn mixed_dataset() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                feature(json!({"NAME": "Monterey SMR", "DESIG": "SMR"}), monterey_rect()),
                feature(json!({"NAME": "No Geometry"}), serde_json::Value::Null),
                feature(json!({"DESIG": "SMCA"}), monterey_rect()),
                feature(json!({"NAME": "A Point"}), json!({"type": "Point", "coordinates": [-121.9, 36.5]})),
                feature(
                    json!({"MPA_name": "Bowtie"}),
                    json!({"type": "Polygon", "coordinates": [[[-120.0, 34.0], [-119.8, 34.2], [-119.8, 34.0], [-120.0, 34.2], [-120.0, 34.0]]]})
                ),
                feature(
                    json!({"name": "Open Ring"}),
                    json!({"type": "Polygon", "coordinates": [[[-118.0, 33.0], [-117.9, 33.0], [-117.9, 33.1], [-118.0, 33.1]]]})
                ),
            ]
        })
    }

    fn pipeline(store: Arc<MemoryStore>) -> ImportPipeline {
        ImportPipeline::new(store, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_import_counts_every_feature() {
        let file = dataset_file(mixed_dataset());
        let store = Arc::new(MemoryStore::new());
        let report = pipeline(store.clone())
            .run(file.path().to_str().unwrap(), "test data")
            .await
            .unwrap();

        assert_eq!(report.features, 6);
        assert_eq!(report.skipped.missing_geometry, 1);
        assert_eq!(report.skipped.missing_name, 1);
        assert_eq!(report.skipped.rejected_by_store, 0);
        // the Point; the bowtie and the open ring are repaired
        assert_eq!(report.skipped.invalid_geometry, 1);
        assert_eq!(report.imported, 3);
        assert_eq!(report.repaired, 2);
        assert_eq!(report.imported + report.skipped.total(), report.features);
        assert_eq!(report.zones_before, 0);
        assert_eq!(report.zones_after, report.imported as i64);

        let zones = store.list_all().await.unwrap();
        assert_eq!(zones[0].name, "Monterey SMR");
        assert_eq!(zones[0].designation.as_deref(), Some("SMR"));
        assert_eq!(zones[0].source.as_deref(), Some("test data"));
        assert!(zones.iter().any(|z| z.name == "Open Ring"));
        let bowtie = zones.iter().find(|z| z.name == "Bowtie").unwrap();
        assert!(bowtie.geometry.is_valid());
        assert!((bowtie.geometry.unsigned_area() - 0.02).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let file = dataset_file(mixed_dataset());
        let location = file.path().to_str().unwrap().to_string();
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(store.clone());

        let first = pipeline.run(&location, "").await.unwrap();
        let second = pipeline.run(&location, "").await.unwrap();

        assert_eq!(second.zones_before, first.zones_after);
        assert_eq!(second.zones_after, first.zones_after);
        assert_eq!(store.list_all().await.unwrap().len() as i64, first.zones_after);
        assert!(store.list_all().await.unwrap()[0].source.is_none());
    }

    #[tokio::test]
    async fn test_fatal_errors_leave_store_untouched() {
        let good = dataset_file(mixed_dataset());
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(store.clone());
        let report = pipeline.run(good.path().to_str().unwrap(), "").await.unwrap();

        let not_collection = dataset_file(json!({"type": "Feature", "properties": {}, "geometry": null}));
        let err = pipeline
            .run(not_collection.path().to_str().unwrap(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));

        let projected = dataset_file(json!({
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}},
            "features": []
        }));
        let err = pipeline
            .run(projected.path().to_str().unwrap(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedCrs(_)));

        let err = pipeline.run("/nonexistent/zones.geojson", "").await.unwrap_err();
        assert!(matches!(err, ImportError::Fetch { .. }));

        assert_eq!(store.list_all().await.unwrap().len() as i64, report.zones_after);
    }
}
