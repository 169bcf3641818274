use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::modules::error::{ExportError, ExportResult};
use crate::modules::store::ObjectStore;

use super::types::{Marker, MarkerKind, MarkerScan, StartedManifest, StartedMarker};

/// Lists and classifies the manifests sitting directly under the export prefix
pub struct MarkerScanner {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
}

impl MarkerScanner {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String, prefix: String) -> Self {
        Self {
            store,
            bucket,
            prefix,
        }
    }

    /// Scan one level under the prefix. Archived and quarantined markers live
    /// in nested paths and are never returned.
    pub async fn scan(&self) -> ExportResult<MarkerScan> {
        let objects = self.store.list(&self.bucket, &self.prefix, Some("/")).await?;

        if objects.is_empty() {
            info!("Export bucket empty: no objects under s3://{}/{}", self.bucket, self.prefix);
            return Ok(MarkerScan::default());
        }

        let mut scan = MarkerScan::default();

        for object in objects {
            let Some(marker) = Marker::classify(&object.key) else {
                debug!("Skipping non-manifest object: {}", object.key);
                continue;
            };

            match marker.kind {
                MarkerKind::Completed => scan.completed.push(marker),
                MarkerKind::Started => match self.read_started(&marker).await {
                    Ok(manifest) => scan.started.push(StartedMarker { marker, manifest }),
                    Err(ExportError::Parse { key, reason }) => {
                        warn!("Malformed started marker {}: {}", key, reason);
                        scan.malformed_started.push(marker);
                    }
                    Err(e) => return Err(e),
                },
            }
        }

        if !scan.malformed_started.is_empty() && scan.started.is_empty() {
            return Err(ExportError::AllMarkersMalformed {
                prefix: self.prefix.clone(),
                count: scan.malformed_started.len(),
            });
        }

        scan.started.sort_by(|a, b| a.marker.key.cmp(&b.marker.key));
        scan.completed.sort_by(|a, b| a.key.cmp(&b.key));
        scan.malformed_started.sort_by(|a, b| a.key.cmp(&b.key));

        info!("Completed objects: {}", scan.completed.len());
        info!("Started objects: {}", scan.started.len());
        if !scan.malformed_started.is_empty() {
            warn!("Malformed started objects: {}", scan.malformed_started.len());
        }

        Ok(scan)
    }

    async fn read_started(&self, marker: &Marker) -> ExportResult<StartedManifest> {
        let body = self.store.get(&self.bucket, &marker.key).await?;
        StartedManifest::from_slice(&body).map_err(|e| ExportError::parse(marker.key.clone(), e))
    }
}
