//! Marker objects and their manifest bodies

use chrono::{DateTime, NaiveDateTime, Utc};
use ion_rs::element::Element;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const STARTED_SUFFIX: &str = "started.manifest";
const COMPLETED_SUFFIX: &str = "completed.manifest";

/// Which half of an export run a marker records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Started,
    Completed,
}

impl MarkerKind {
    fn suffix(self) -> &'static str {
        match self {
            Self::Started => STARTED_SUFFIX,
            Self::Completed => COMPLETED_SUFFIX,
        }
    }
}

/// Key prefix shared by the started and completed markers of one export run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExportGroupId(String);

impl ExportGroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExportGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A classified marker object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub key: String,
    pub kind: MarkerKind,
    pub group: ExportGroupId,
}

impl Marker {
    /// Classify an object key by its file name. Keys that are not manifests
    /// (exported journal data, folder placeholders) yield `None`.
    pub fn classify(key: &str) -> Option<Self> {
        let name_start = key.rfind('/').map(|i| i + 1).unwrap_or(0);
        let name = &key[name_start..];

        let kind = if name.contains(STARTED_SUFFIX) {
            MarkerKind::Started
        } else if name.contains(COMPLETED_SUFFIX) {
            MarkerKind::Completed
        } else {
            return None;
        };

        let suffix_at = name_start + name.find(kind.suffix())?;
        let group = key[..suffix_at].trim_end_matches('.');

        Some(Self {
            key: key.to_string(),
            kind,
            group: ExportGroupId(group.to_string()),
        })
    }
}

/// Body of a started marker, as written by the export job.
///
/// The job writes Ion text. JSON bodies decode too since JSON is a subset
/// of Ion text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedManifest {
    pub export_id: String,
    pub exclusive_end_time: DateTime<Utc>,
    pub inclusive_start_time: Option<DateTime<Utc>>,
}

/// Why a started manifest body could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("body is not a single Ion value: {0}")]
    Decode(String),

    #[error("body is not a struct")]
    NotAStruct,

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' has invalid value {value}")]
    InvalidField { field: &'static str, value: String },
}

impl StartedManifest {
    pub fn from_slice(body: &[u8]) -> Result<Self, ManifestError> {
        let element = Element::read_one(body).map_err(|e| ManifestError::Decode(e.to_string()))?;
        let fields = element.as_struct().ok_or(ManifestError::NotAStruct)?;

        let export_id = match fields.get("exportId") {
            Some(value) => value.as_text().ok_or_else(|| ManifestError::InvalidField {
                field: "exportId",
                value: value.to_string(),
            })?,
            None => return Err(ManifestError::MissingField("exportId")),
        };

        let exclusive_end_time = match fields.get("exclusiveEndTime") {
            Some(value) => manifest_time("exclusiveEndTime", value)?,
            None => return Err(ManifestError::MissingField("exclusiveEndTime")),
        };

        let inclusive_start_time = match fields.get("inclusiveStartTime") {
            Some(value) if !value.is_null() => Some(manifest_time("inclusiveStartTime", value)?),
            _ => None,
        };

        Ok(Self {
            export_id: export_id.to_string(),
            exclusive_end_time,
            inclusive_start_time,
        })
    }
}

/// Manifest times arrive as Ion timestamps or, from older writers, strings
fn manifest_time(field: &'static str, value: &Element) -> Result<DateTime<Utc>, ManifestError> {
    let text = match (value.as_timestamp(), value.as_text()) {
        (Some(timestamp), _) => timestamp.to_string(),
        (None, Some(text)) => text.to_string(),
        (None, None) => String::new(),
    };

    parse_timestamp(&text).ok_or_else(|| ManifestError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// A started marker together with its decoded manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedMarker {
    pub marker: Marker,
    pub manifest: StartedManifest,
}

impl StartedMarker {
    pub fn key(&self) -> &str {
        &self.marker.key
    }

    pub fn group(&self) -> &ExportGroupId {
        &self.marker.group
    }

    pub fn export_id(&self) -> &str {
        &self.manifest.export_id
    }

    pub fn exclusive_end_time(&self) -> DateTime<Utc> {
        self.manifest.exclusive_end_time
    }
}

/// Markers found directly under the manifest prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerScan {
    pub started: Vec<StartedMarker>,
    pub completed: Vec<Marker>,
    /// Started markers whose body could not be decoded
    pub malformed_started: Vec<Marker>,
}

impl MarkerScan {
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.completed.is_empty() && self.malformed_started.is_empty()
    }

    pub fn has_completed(&self, group: &ExportGroupId) -> bool {
        self.completed.iter().any(|c| &c.group == group)
    }

    pub fn completed_for<'a>(&'a self, group: &'a ExportGroupId) -> impl Iterator<Item = &'a Marker> {
        self.completed.iter().filter(move |c| &c.group == group)
    }
}

/// Parse a manifest timestamp.
///
/// Accepts RFC 3339 and the reduced precision forms the export job writes
/// (`2023-01-01T00:00Z`, `2023-01-01T00:00+00:00`, `2023-01-01T00:00`).
/// Timestamps without an offset are UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let with_offset = DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z"));
    if let Ok(parsed) = with_offset {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = value.strip_suffix('Z').unwrap_or(value);
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|parsed| parsed.and_utc())
}
