//! Export state reconciliation
//!
//! Turns a marker scan into an assessment without touching any remote
//! service, so the same scan always yields the same decision:
//! - which runs still look in progress
//! - the next export window
//! - where consumed markers are archived

pub mod core;
pub mod layout;
pub mod types;

pub use self::core::{
    in_progress, next_window, orphaned_completed, reconcile, unreadable_in_progress,
};
pub use layout::LedgerLayout;
pub use types::{Assessment, ExportPlan, Relocation, TimeWindow};
