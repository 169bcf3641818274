//! Error types shared across the export reconciliation workflow

use thiserror::Error;

use crate::modules::job_service::JobServiceError;
use crate::modules::store::StoreError;

/// Result type for a reconciliation invocation
pub type ExportResult<T> = Result<T, ExportError>;

/// Everything that can end an invocation early
#[derive(Error, Debug)]
pub enum ExportError {
    /// Object store operation failed (listing, reading, or relocating a marker)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A started manifest body could not be decoded
    #[error("Malformed marker {key}: {reason}")]
    Parse { key: String, reason: String },

    /// Every started manifest under the prefix was malformed
    #[error("All {count} started markers under '{prefix}' are malformed")]
    AllMarkersMalformed { prefix: String, count: usize },

    /// Status lookup failed for a reason other than the export being unknown
    #[error("Failed to check status of export {export_id}: {source}")]
    JobStatus {
        export_id: String,
        #[source]
        source: JobServiceError,
    },

    /// The new export could not be submitted
    #[error("Failed to submit export: {0}")]
    Submit(#[source] JobServiceError),

    /// The frontier is not behind the invocation clock
    #[error("Export window is empty: start {start} is not before end {end}")]
    EmptyWindow { start: String, end: String },

    /// The invocation did not finish within its deadline
    #[error("Export reconciliation did not finish within {0:?}")]
    DeadlineExceeded(std::time::Duration),

    /// Missing or invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExportError {
    pub fn parse(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }
}
