use chrono::{DateTime, Utc};

/// Key layout of the manifest prefix and its archive sub-paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLayout {
    prefix: String,
    archive_root: String,
}

impl LedgerLayout {
    pub fn new(prefix: impl Into<String>, archive_root: impl Into<String>) -> Self {
        let mut archive_root = archive_root.into();
        if !archive_root.is_empty() && !archive_root.ends_with('/') {
            archive_root.push('/');
        }

        Self {
            prefix: prefix.into(),
            archive_root,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<root>completed/YYYY/MM/DD/HH/`, partitioned by the run's end time
    pub fn completed_partition(&self, exclusive_end: DateTime<Utc>) -> String {
        format!(
            "{}completed/{}",
            self.archive_root,
            exclusive_end.format("%Y/%m/%d/%H/")
        )
    }

    /// Archive key for a consumed marker: its key relative to the prefix,
    /// under the dated partition
    pub fn archive_key(&self, marker_key: &str, exclusive_end: DateTime<Utc>) -> String {
        let relative = marker_key.strip_prefix(self.prefix.as_str()).unwrap_or(marker_key);
        format!("{}{}", self.completed_partition(exclusive_end), relative)
    }

    /// Quarantine key for the marker of a failed run: `<root>failed/<key>`
    pub fn quarantine_key(&self, marker_key: &str) -> String {
        format!("{}failed/{}", self.archive_root, marker_key)
    }
}
