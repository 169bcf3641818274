//! Types produced by reconciliation

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::modules::marker::{Marker, StartedMarker};

/// Half-open export range `[inclusive_start, exclusive_end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub inclusive_start: DateTime<Utc>,
    pub exclusive_end: DateTime<Utc>,
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.inclusive_start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.exclusive_end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// One copy-then-delete move of a marker object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub source_key: String,
    pub destination_key: String,
}

/// What to do once no run is in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub window: TimeWindow,
    /// Ordered moves to apply after the export is submitted: each run's
    /// completed marker precedes its started marker.
    pub archive: Vec<Relocation>,
}

/// The export state inferred from a marker scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    /// Started markers with no completed counterpart. Each readable one must
    /// be confirmed with the job service. Unreadable ones name no export to
    /// look up and block until an operator removes them.
    InProgress {
        running: Vec<StartedMarker>,
        unreadable: Vec<Marker>,
    },
    /// Nothing is running; the next export can be submitted.
    Ready(ExportPlan),
}
