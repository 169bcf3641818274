//! Export manifest markers
//!
//! Every export run leaves a `*.started.manifest` object when it begins and a
//! `*.completed.manifest` object when it finishes. The two share a key prefix,
//! which identifies the run.

pub mod scanner;
pub mod types;

pub use scanner::MarkerScanner;
pub use types::{
    parse_timestamp, ExportGroupId, ManifestError, Marker, MarkerKind, MarkerScan,
    StartedManifest, StartedMarker,
};

#[cfg(test)]
mod tests;
