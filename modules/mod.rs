//! Library for reconciling scheduled journal exports
//!
//! This library provides modules for:
//! - Manifest marker discovery and classification
//! - Pure export state reconciliation and window planning
//! - Verified relocation of markers in the object store
//! - Export job control through the job service
//! - The processor that drives one invocation end to end

pub mod config;
pub mod error;
pub mod export_processor;
pub mod job_service;
pub mod marker;
pub mod reconciler;
pub mod store;

// Re-export commonly used types and structs
pub use config::ExportConfig;
pub use error::{ExportError, ExportResult};
pub use export_processor::{ExportProcessor, InvocationOutcome, IN_PROGRESS_MESSAGE};
pub use job_service::{JobService, QldbJobService};
pub use marker::{MarkerScan, MarkerScanner};
pub use reconciler::{reconcile, Assessment, LedgerLayout, TimeWindow};
pub use store::{MemoryObjectStore, ObjectStore, S3ObjectStore};
