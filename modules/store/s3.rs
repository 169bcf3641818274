use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

use super::{ObjectStore, ObjectSummary, StoreError, StoreResult};

/// `ObjectStore` over an S3 bucket
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
}

impl S3ObjectStore {
    pub fn new(s3_client: Arc<S3Client>) -> Self {
        Self { s3_client }
    }
}

/// `CopySource` header value. S3 expects the key URL-encoded; the path
/// separators stay literal.
fn copy_source(bucket: &str, key: &str) -> String {
    let encoded: Vec<_> = key.split('/').map(urlencoding::encode).collect();
    format!("{}/{}", bucket, encoded.join("/"))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> StoreResult<Vec<ObjectSummary>> {
        debug!("Listing s3://{}/{} (delimiter: {:?})", bucket, prefix, delimiter);

        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .s3_client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_delimiter(delimiter.map(str::to_string))
                .set_continuation_token(continuation_token.take())
                .max_keys(1000)
                .send()
                .await
                .map_err(|e| StoreError::request("list", bucket, prefix, DisplayErrorContext(&e)))?;

            for object in response.contents() {
                let Some(key) = object.key() else { continue };
                objects.push(ObjectSummary {
                    key: key.to_string(),
                    size_bytes: object.size().unwrap_or(0).max(0) as u64,
                });
            }

            continuation_token = response.next_continuation_token().map(|s| s.to_string());
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }

    async fn get(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        let response = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                    StoreError::not_found(bucket, key)
                } else {
                    StoreError::request("get", bucket, key, DisplayErrorContext(&e))
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::request("read body of", bucket, key, e))?;

        Ok(body.into_bytes())
    }

    async fn copy(&self, bucket: &str, source_key: &str, destination_key: &str) -> StoreResult<()> {
        self.s3_client
            .copy_object()
            .bucket(bucket)
            .copy_source(copy_source(bucket, source_key))
            .key(destination_key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().and_then(|se| se.code()) == Some("NoSuchKey") {
                    StoreError::not_found(bucket, source_key)
                } else {
                    StoreError::request("copy", bucket, source_key, DisplayErrorContext(&e))
                }
            })?;

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.s3_client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::request("delete", bucket, key, DisplayErrorContext(&e)))?;

        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> StoreResult<bool> {
        match self
            .s3_client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false) => Ok(false),
            Err(e) => Err(StoreError::request("head", bucket, key, DisplayErrorContext(&e))),
        }
    }
}
