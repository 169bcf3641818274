//! Export processor module for the scheduled journal export
//!
//! Each invocation:
//! - Scans the manifest markers under the export prefix
//! - Reconciles them into an export state
//! - Confirms unpaired runs with the job service, quarantining unknown ones
//! - Otherwise submits the next window and archives the consumed markers

pub mod core;
pub mod types;

pub use self::core::ExportProcessor;
pub use types::{InvocationOutcome, RunCheck, RunState, IN_PROGRESS_MESSAGE};
