//! Object store access for the export manifests
//!
//! This module provides:
//! - The `ObjectStore` trait the reconciler is written against
//! - An S3 implementation backed by `aws-sdk-s3`
//! - An in-memory implementation with fault injection for tests
//! - Verified copy-then-delete relocation of marker objects

pub mod memory;
pub mod relocate;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use memory::{MemoryObjectStore, StoreOp};
pub use relocate::relocate;
pub use s3::S3ObjectStore;

/// Result type for object store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Object store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed object does not exist
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The remote call itself failed
    #[error("Failed to {operation} s3://{bucket}/{key}: {message}")]
    Request {
        operation: &'static str,
        bucket: String,
        key: String,
        message: String,
    },

    /// Copy reported success but the destination is not readable
    #[error("Copy of {source_key} to {destination_key} could not be verified")]
    CopyNotVerified {
        source_key: String,
        destination_key: String,
    },
}

impl StoreError {
    pub fn not_found(bucket: &str, key: &str) -> Self {
        Self::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn request(
        operation: &'static str,
        bucket: &str,
        key: &str,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Request {
            operation,
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// An object returned by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size_bytes: u64,
}

/// The object store primitives the reconciler relies on
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects under `prefix`. With a delimiter only the objects directly
    /// under the prefix are returned; deeper keys are rolled up and skipped.
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> StoreResult<Vec<ObjectSummary>>;

    /// Read a whole object body
    async fn get(&self, bucket: &str, key: &str) -> StoreResult<Bytes>;

    /// Server-side copy within a bucket
    async fn copy(&self, bucket: &str, source_key: &str, destination_key: &str) -> StoreResult<()>;

    /// Delete an object. Deleting a missing key succeeds.
    async fn delete(&self, bucket: &str, key: &str) -> StoreResult<()>;

    /// Whether an object exists at `key`
    async fn exists(&self, bucket: &str, key: &str) -> StoreResult<bool>;
}
