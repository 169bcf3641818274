//! Applies a reconciliation assessment: status checks, quarantine, submission
//! and archiving

use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::modules::config::ExportConfig;
use crate::modules::error::{ExportError, ExportResult};
use crate::modules::job_service::{ExportLookup, ExportRequest, JobService};
use crate::modules::marker::{Marker, MarkerScan, MarkerScanner, StartedMarker};
use crate::modules::reconciler::{
    orphaned_completed, reconcile, Assessment, ExportPlan, LedgerLayout,
};
use crate::modules::store::{relocate, ObjectStore};

use super::types::{InvocationOutcome, RunCheck, RunState};

/// Runs one export reconciliation against the manifest prefix
///
/// Holds no state between invocations; everything is inferred from the
/// markers on every run.
pub struct ExportProcessor {
    store: Arc<dyn ObjectStore>,
    job_service: Arc<dyn JobService>,
    config: ExportConfig,
    layout: LedgerLayout,
}

impl ExportProcessor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        job_service: Arc<dyn JobService>,
        config: ExportConfig,
    ) -> Self {
        let layout = config.layout();
        Self {
            store,
            job_service,
            config,
            layout,
        }
    }

    // === Main Execution ===

    /// Reconcile using the current wall clock as the end of the next window
    pub async fn run(&self) -> ExportResult<InvocationOutcome> {
        self.run_at(Utc::now()).await
    }

    /// Like `run`, but gives up with `DeadlineExceeded` once `deadline` has
    /// passed. Moves already applied stay applied; every move is retry safe.
    pub async fn run_with_deadline(&self, deadline: Option<Duration>) -> ExportResult<InvocationOutcome> {
        match deadline {
            Some(limit) => tokio::time::timeout(limit, self.run())
                .await
                .map_err(|_| ExportError::DeadlineExceeded(limit))?,
            None => self.run().await,
        }
    }

    /// Reconcile with `now` as the end of the next window.
    ///
    /// `now` is truncated to milliseconds, the precision the job service
    /// keeps, so the recorded end time matches the window that was planned.
    pub async fn run_at(&self, now: DateTime<Utc>) -> ExportResult<InvocationOutcome> {
        let now = now.trunc_subsecs(3);
        info!(
            "Reconciling exports of {} under s3://{}/{}",
            self.config.ledger_name, self.config.bucket, self.config.prefix
        );

        let scan = self.scan_markers().await?;

        match reconcile(&scan, now, self.config.epoch_start, &self.layout)? {
            Assessment::InProgress { running, unreadable } => {
                self.check_in_progress(running, unreadable).await
            }
            Assessment::Ready(plan) => self.submit_and_archive(plan).await,
        }
    }

    /// Lists and classifies the markers currently under the prefix
    pub async fn scan_markers(&self) -> ExportResult<MarkerScan> {
        let scanner = MarkerScanner::new(
            self.store.clone(),
            self.config.bucket.clone(),
            self.config.prefix.clone(),
        );
        let scan = scanner.scan().await?;

        for orphan in orphaned_completed(&scan) {
            warn!("Completed marker {} has no started marker, leaving it in place", orphan.key);
        }
        for marker in scan.malformed_started.iter().filter(|m| scan.has_completed(&m.group)) {
            warn!("Finished run {} has an unreadable started marker, leaving it in place", marker.group);
        }

        Ok(scan)
    }

    // === In-progress Runs ===

    async fn check_in_progress(
        &self,
        running: Vec<StartedMarker>,
        unreadable: Vec<Marker>,
    ) -> ExportResult<InvocationOutcome> {
        warn!("In Progress objects: {}", running.len() + unreadable.len());

        let mut runs = Vec::with_capacity(running.len() + unreadable.len());
        for started in running {
            runs.push(self.check_run(&started).await?);
        }
        for marker in unreadable {
            error!("Started marker {} is unreadable and blocks new exports until removed", marker.key);
            runs.push(RunCheck {
                marker_key: marker.key,
                export_id: None,
                state: RunState::Unreadable,
            });
        }

        Ok(InvocationOutcome::InProgress { runs })
    }

    /// Confirms one unpaired started marker with the job service and
    /// quarantines it when the export is unknown
    async fn check_run(&self, started: &StartedMarker) -> ExportResult<RunCheck> {
        let export_id = started.export_id();
        info!("Checking status of exportid: {}", export_id);

        let lookup = self
            .job_service
            .describe_export(&self.config.ledger_name, export_id)
            .await
            .map_err(|source| ExportError::JobStatus {
                export_id: export_id.to_string(),
                source,
            })?;

        let state = match lookup {
            ExportLookup::Found(status) => {
                info!("Export {} is still known to the job service with status {}", export_id, status);
                RunState::Running(status)
            }
            ExportLookup::NotFound => {
                let destination_key = self.layout.quarantine_key(started.key());
                error!("ExportId {} not Found!", export_id);
                error!("Moving {} to {}", started.key(), destination_key);

                relocate(self.store.as_ref(), &self.config.bucket, started.key(), &destination_key).await?;
                RunState::Quarantined { destination_key }
            }
        };

        Ok(RunCheck {
            marker_key: started.key().to_string(),
            export_id: Some(export_id.to_string()),
            state,
        })
    }

    // === Submission and Archiving ===

    async fn submit_and_archive(&self, plan: ExportPlan) -> ExportResult<InvocationOutcome> {
        info!("New InclusiveStartTime: {}", plan.window.inclusive_start);
        info!("Next export window: {}", plan.window);

        let request = ExportRequest {
            job_name: self.config.ledger_name.clone(),
            window: plan.window,
            destination: self.config.destination(),
            role_arn: self.config.role_arn.clone(),
            encryption: self.config.encryption(),
        };

        let export_id = self
            .job_service
            .submit_export(&request)
            .await
            .map_err(ExportError::Submit)?;
        info!("Submitted export {} for {}", export_id, plan.window);

        for relocation in &plan.archive {
            relocate(
                self.store.as_ref(),
                &self.config.bucket,
                &relocation.source_key,
                &relocation.destination_key,
            )
            .await?;
        }
        info!("Archived {} consumed markers", plan.archive.len());

        Ok(InvocationOutcome::ExportSubmitted {
            export_id,
            window: plan.window,
            archived: plan.archive.len(),
        })
    }
}
