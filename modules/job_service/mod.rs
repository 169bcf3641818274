//! Remote journal export job control
//!
//! The reconciler only needs two calls from the job service: look up an
//! export by id, and submit a new export for a time window.

pub mod qldb;
pub mod types;

use async_trait::async_trait;

pub use qldb::QldbJobService;
pub use types::{
    ExportDestination, ExportEncryption, ExportLookup, ExportRequest, ExportStatus,
    JobServiceError,
};

/// Export job control operations
#[async_trait]
pub trait JobService: Send + Sync {
    /// Look up an export. An unknown export id is `ExportLookup::NotFound`,
    /// not an error.
    async fn describe_export(
        &self,
        job_name: &str,
        export_id: &str,
    ) -> Result<ExportLookup, JobServiceError>;

    /// Start an export and return its id
    async fn submit_export(&self, request: &ExportRequest) -> Result<String, JobServiceError>;
}
