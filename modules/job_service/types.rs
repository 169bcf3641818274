//! Types exchanged with the export job service

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::modules::reconciler::TimeWindow;

/// Job service failures other than "export not found"
#[derive(Error, Debug)]
pub enum JobServiceError {
    /// The request could not be assembled
    #[error("Invalid export request: {0}")]
    InvalidRequest(String),

    /// The remote call failed
    #[error("Job service request failed: {0}")]
    Request(String),
}

/// Lifecycle status reported for a known export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportStatus {
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Result of looking up an export by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportLookup {
    Found(ExportStatus),
    NotFound,
}

/// Server-side encryption applied to exported objects
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportEncryption {
    #[default]
    None,
    Kms { key_arn: String },
}

/// Where the export writes its data and manifests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDestination {
    pub bucket: String,
    pub prefix: String,
}

/// A request to export one window of the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub job_name: String,
    pub window: TimeWindow,
    pub destination: ExportDestination,
    pub role_arn: String,
    pub encryption: ExportEncryption,
}
