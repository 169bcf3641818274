//! Outcomes reported by an export reconciliation

use serde::{Deserialize, Serialize};

use crate::modules::job_service::ExportStatus;
use crate::modules::reconciler::TimeWindow;

/// Status message returned while a run blocks planning
pub const IN_PROGRESS_MESSAGE: &str = "Export is currently in progress....";

/// What happened to one in-progress run during the status check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// The job service still knows the export
    Running(ExportStatus),
    /// The export is unknown; its started marker was moved aside
    Quarantined { destination_key: String },
    /// The started marker could not be decoded and was left in place
    Unreadable,
}

/// Status check result for one started marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCheck {
    pub marker_key: String,
    /// `None` when the manifest body could not be decoded
    pub export_id: Option<String>,
    pub state: RunState,
}

/// Successful end of an invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationOutcome {
    /// At least one run was in progress; nothing was submitted
    InProgress { runs: Vec<RunCheck> },
    /// A new export was submitted and the consumed markers archived
    ExportSubmitted {
        export_id: String,
        window: TimeWindow,
        archived: usize,
    },
}

impl InvocationOutcome {
    pub fn status_message(&self) -> String {
        match self {
            Self::InProgress { .. } => IN_PROGRESS_MESSAGE.to_string(),
            Self::ExportSubmitted {
                export_id, window, ..
            } => format!("Export {} submitted for {}", export_id, window),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }

    /// Keys of started markers that block planning because they are unreadable
    pub fn unreadable(&self) -> Vec<&str> {
        match self {
            Self::InProgress { runs } => runs
                .iter()
                .filter(|r| r.state == RunState::Unreadable)
                .map(|r| r.marker_key.as_str())
                .collect(),
            Self::ExportSubmitted { .. } => Vec::new(),
        }
    }

    /// Keys of started markers quarantined during this invocation
    pub fn quarantined(&self) -> Vec<&str> {
        match self {
            Self::InProgress { runs } => runs
                .iter()
                .filter(|r| matches!(r.state, RunState::Quarantined { .. }))
                .map(|r| r.marker_key.as_str())
                .collect(),
            Self::ExportSubmitted { .. } => Vec::new(),
        }
    }
}
