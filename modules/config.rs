//! Invocation configuration, read from the environment

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::modules::error::{ExportError, ExportResult};
use crate::modules::job_service::{ExportDestination, ExportEncryption};
use crate::modules::marker::parse_timestamp;
use crate::modules::reconciler::LedgerLayout;

pub const ENV_BUCKET: &str = "ExportJournalBucket";
pub const ENV_PREFIX: &str = "ExportJournalPrefix";
pub const ENV_LEDGER_NAME: &str = "QLDBName";
pub const ENV_ROLE_ARN: &str = "ExportJournalRole";
pub const ENV_ARCHIVE_ROOT: &str = "ExportArchiveRoot";
pub const ENV_KMS_KEY_ARN: &str = "ExportKmsKeyArn";
pub const ENV_EPOCH_START: &str = "ExportEpochStart";
pub const ENV_TIMEOUT_SECS: &str = "ExportInvocationTimeoutSecs";

/// Configuration for one export reconciliation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub bucket: String,
    pub prefix: String,
    pub ledger_name: String,
    pub role_arn: String,
    /// Root of the `completed/` and `failed/` sub-paths
    pub archive_root: String,
    pub kms_key_arn: Option<String>,
    /// Start of the very first export window
    pub epoch_start: DateTime<Utc>,
    pub invocation_timeout_secs: Option<u64>,
}

/// Default start of the first window: 2019-01-01T00:00:00Z
pub fn default_epoch_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

impl ExportConfig {
    pub fn from_env() -> ExportResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any name -> value source. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> ExportResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &str| {
            get(name).ok_or_else(|| ExportError::config(format!("{} is not set", name)))
        };

        let prefix = require(ENV_PREFIX)?;

        let epoch_start = match get(ENV_EPOCH_START) {
            Some(raw) => parse_timestamp(&raw).ok_or_else(|| {
                ExportError::config(format!("{} is not a timestamp: '{}'", ENV_EPOCH_START, raw))
            })?,
            None => default_epoch_start(),
        };

        let invocation_timeout_secs = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
                ExportError::config(format!("{} is not a number of seconds: {}", ENV_TIMEOUT_SECS, e))
            })?),
            None => None,
        };

        Ok(Self {
            bucket: require(ENV_BUCKET)?,
            archive_root: get(ENV_ARCHIVE_ROOT).unwrap_or_else(|| prefix.clone()),
            prefix,
            ledger_name: require(ENV_LEDGER_NAME)?,
            role_arn: require(ENV_ROLE_ARN)?,
            kms_key_arn: get(ENV_KMS_KEY_ARN),
            epoch_start,
            invocation_timeout_secs,
        })
    }

    pub fn layout(&self) -> LedgerLayout {
        LedgerLayout::new(self.prefix.clone(), self.archive_root.clone())
    }

    pub fn destination(&self) -> ExportDestination {
        ExportDestination {
            bucket: self.bucket.clone(),
            prefix: self.prefix.clone(),
        }
    }

    pub fn encryption(&self) -> ExportEncryption {
        match &self.kms_key_arn {
            Some(key_arn) => ExportEncryption::Kms {
                key_arn: key_arn.clone(),
            },
            None => ExportEncryption::None,
        }
    }

    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.invocation_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_BUCKET, "ledger-exports"),
            (ENV_PREFIX, "manifests/"),
            (ENV_LEDGER_NAME, "vehicle-registration"),
            (ENV_ROLE_ARN, "arn:aws:iam::123456789012:role/qldb-export"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> ExportResult<ExportConfig> {
        ExportConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.bucket, "ledger-exports");
        assert_eq!(config.archive_root, "manifests/");
        assert_eq!(config.epoch_start, Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(config.encryption(), ExportEncryption::None);
        assert_eq!(config.invocation_timeout(), None);
    }

    #[test]
    fn test_optional_overrides() {
        let mut env = base_env();
        env.insert(ENV_ARCHIVE_ROOT, "archive/");
        env.insert(ENV_KMS_KEY_ARN, "arn:aws:kms:eu-west-1:123456789012:key/abc");
        env.insert(ENV_EPOCH_START, "2021-06-01T00:00Z");
        env.insert(ENV_TIMEOUT_SECS, "300");

        let config = load(&env).unwrap();

        assert_eq!(config.archive_root, "archive/");
        assert_eq!(
            config.encryption(),
            ExportEncryption::Kms {
                key_arn: "arn:aws:kms:eu-west-1:123456789012:key/abc".to_string()
            }
        );
        assert_eq!(config.epoch_start, Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(config.invocation_timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_missing_required_value() {
        let mut env = base_env();
        env.remove(ENV_LEDGER_NAME);

        let err = load(&env).unwrap_err();

        assert!(err.to_string().contains(ENV_LEDGER_NAME));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut env = base_env();
        env.insert(ENV_ROLE_ARN, "   ");

        assert!(matches!(load(&env), Err(ExportError::Config(_))));
    }

    #[test]
    fn test_invalid_epoch() {
        let mut env = base_env();
        env.insert(ENV_EPOCH_START, "last tuesday");

        assert!(matches!(load(&env), Err(ExportError::Config(_))));
    }
}
