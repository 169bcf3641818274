use async_trait::async_trait;
use aws_sdk_qldb::error::DisplayErrorContext;
use aws_sdk_qldb::primitives::DateTime as AwsDateTime;
use aws_sdk_qldb::types::{
    OutputFormat, S3EncryptionConfiguration, S3ExportConfiguration, S3ObjectEncryptionType,
};
use aws_sdk_qldb::Client as QldbClient;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use super::types::{ExportEncryption, ExportLookup, ExportRequest, ExportStatus, JobServiceError};

/// Format of the data and manifests an export writes. Manifest decoding
/// expects Ion text.
const EXPORT_FORMAT: OutputFormat = OutputFormat::IonText;
use super::JobService;

/// `JobService` backed by QLDB journal exports to S3
pub struct QldbJobService {
    qldb_client: Arc<QldbClient>,
}

impl QldbJobService {
    pub fn new(qldb_client: Arc<QldbClient>) -> Self {
        Self { qldb_client }
    }

    fn to_aws_time(time: DateTime<Utc>) -> AwsDateTime {
        AwsDateTime::from_millis(time.timestamp_millis())
    }

    fn encryption_configuration(
        encryption: &ExportEncryption,
    ) -> Result<S3EncryptionConfiguration, JobServiceError> {
        let builder = match encryption {
            ExportEncryption::None => S3EncryptionConfiguration::builder()
                .object_encryption_type(S3ObjectEncryptionType::NoEncryption),
            ExportEncryption::Kms { key_arn } => S3EncryptionConfiguration::builder()
                .object_encryption_type(S3ObjectEncryptionType::SseKms)
                .kms_key_arn(key_arn),
        };

        builder
            .build()
            .map_err(|e| JobServiceError::InvalidRequest(e.to_string()))
    }
}

fn parse_status(status: &str) -> ExportStatus {
    match status {
        "IN_PROGRESS" => ExportStatus::InProgress,
        "COMPLETED" => ExportStatus::Completed,
        "CANCELLED" => ExportStatus::Cancelled,
        other => ExportStatus::Other(other.to_string()),
    }
}

#[async_trait]
impl JobService for QldbJobService {
    async fn describe_export(
        &self,
        job_name: &str,
        export_id: &str,
    ) -> Result<ExportLookup, JobServiceError> {
        let result = self
            .qldb_client
            .describe_journal_s3_export()
            .name(job_name)
            .export_id(export_id)
            .send()
            .await;

        match result {
            Ok(output) => {
                let status = output
                    .export_description()
                    .map(|description| parse_status(description.status().as_str()))
                    .unwrap_or_else(|| ExportStatus::Other("UNKNOWN".to_string()));
                Ok(ExportLookup::Found(status))
            }
            Err(e)
                if e
                    .as_service_error()
                    .map(|se| se.is_resource_not_found_exception())
                    .unwrap_or(false) =>
            {
                Ok(ExportLookup::NotFound)
            }
            Err(e) => Err(JobServiceError::Request(DisplayErrorContext(&e).to_string())),
        }
    }

    async fn submit_export(&self, request: &ExportRequest) -> Result<String, JobServiceError> {
        let encryption = Self::encryption_configuration(&request.encryption)?;
        let s3_export_configuration = S3ExportConfiguration::builder()
            .bucket(&request.destination.bucket)
            .prefix(&request.destination.prefix)
            .encryption_configuration(encryption)
            .build()
            .map_err(|e| JobServiceError::InvalidRequest(e.to_string()))?;

        info!(
            "Requesting journal export of {} for {} into s3://{}/{}",
            request.job_name, request.window, request.destination.bucket, request.destination.prefix
        );

        let output = self
            .qldb_client
            .export_journal_to_s3()
            .name(&request.job_name)
            .inclusive_start_time(Self::to_aws_time(request.window.inclusive_start))
            .exclusive_end_time(Self::to_aws_time(request.window.exclusive_end))
            .s3_export_configuration(s3_export_configuration)
            .role_arn(&request.role_arn)
            .output_format(EXPORT_FORMAT)
            .send()
            .await
            .map_err(|e| JobServiceError::Request(DisplayErrorContext(&e).to_string()))?;

        Ok(output.export_id().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("IN_PROGRESS"), ExportStatus::InProgress);
        assert_eq!(parse_status("COMPLETED"), ExportStatus::Completed);
        assert_eq!(parse_status("CANCELLED"), ExportStatus::Cancelled);
        assert_eq!(parse_status("PAUSED"), ExportStatus::Other("PAUSED".to_string()));
    }

    #[test]
    fn test_exports_request_ion_text() {
        assert_eq!(EXPORT_FORMAT.as_str(), "ION_TEXT");
    }

    #[test]
    fn test_aws_time_keeps_millis() {
        let time = DateTime::parse_from_rfc3339("2023-01-01T00:00:00.250Z")
            .unwrap()
            .with_timezone(&Utc);

        let converted = QldbJobService::to_aws_time(time);

        assert_eq!(converted.secs(), 1_672_531_200);
        assert_eq!(converted.subsec_nanos(), 250_000_000);
    }
}
