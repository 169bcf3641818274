//! In-memory object store for testing

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ObjectStore, ObjectSummary, StoreError, StoreResult};

/// Store primitive, used to script failures and inspect the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Get,
    Copy,
    Delete,
    Exists,
}

#[derive(Default)]
struct Faults {
    failing: HashSet<(StoreOp, String)>,
    dropped_copies: HashSet<String>,
}

/// Bucket/key map with optional injected failures.
///
/// Faults are keyed by the key the operation addresses: the prefix for `List`,
/// the source key for `Copy`.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<BTreeMap<(String, String), Bytes>>>,
    faults: Arc<RwLock<Faults>>,
    operations: Arc<RwLock<Vec<(StoreOp, String)>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), body.into());
    }

    /// All keys currently stored in `bucket`, sorted
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub async fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .read()
            .await
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    /// Make every `op` addressed at `key` fail with a request error
    pub async fn fail_on(&self, op: StoreOp, key: &str) {
        self.faults.write().await.failing.insert((op, key.to_string()));
    }

    /// Make copies into `destination_key` report success without writing anything
    pub async fn drop_copies_to(&self, destination_key: &str) {
        self.faults
            .write()
            .await
            .dropped_copies
            .insert(destination_key.to_string());
    }

    pub async fn clear_faults(&self) {
        *self.faults.write().await = Faults::default();
    }

    /// Every mutating call made so far, in order
    pub async fn mutations(&self) -> Vec<(StoreOp, String)> {
        self.operations
            .read()
            .await
            .iter()
            .filter(|(op, _)| matches!(op, StoreOp::Copy | StoreOp::Delete))
            .cloned()
            .collect()
    }

    async fn record(&self, op: StoreOp, bucket: &str, key: &str) -> StoreResult<()> {
        self.operations.write().await.push((op, key.to_string()));
        if self.faults.read().await.failing.contains(&(op, key.to_string())) {
            return Err(StoreError::request(
                op_name(op),
                bucket,
                key,
                "injected failure",
            ));
        }
        Ok(())
    }
}

fn op_name(op: StoreOp) -> &'static str {
    match op {
        StoreOp::List => "list",
        StoreOp::Get => "get",
        StoreOp::Copy => "copy",
        StoreOp::Delete => "delete",
        StoreOp::Exists => "head",
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> StoreResult<Vec<ObjectSummary>> {
        self.record(StoreOp::List, bucket, prefix).await?;

        let objects = self.objects.read().await;
        let summaries = objects
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .filter(|((_, k), _)| match delimiter {
                Some(d) => !k[prefix.len()..].contains(d),
                None => true,
            })
            .map(|((_, k), body)| ObjectSummary {
                key: k.clone(),
                size_bytes: body.len() as u64,
            })
            .collect();

        Ok(summaries)
    }

    async fn get(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        self.record(StoreOp::Get, bucket, key).await?;

        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(bucket, key))
    }

    async fn copy(&self, bucket: &str, source_key: &str, destination_key: &str) -> StoreResult<()> {
        self.record(StoreOp::Copy, bucket, source_key).await?;

        let mut objects = self.objects.write().await;
        let body = objects
            .get(&(bucket.to_string(), source_key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(bucket, source_key))?;

        if self.faults.read().await.dropped_copies.contains(destination_key) {
            return Ok(());
        }

        objects.insert((bucket.to_string(), destination_key.to_string()), body);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.record(StoreOp::Delete, bucket, key).await?;

        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> StoreResult<bool> {
        self.record(StoreOp::Exists, bucket, key).await?;
        Ok(self.contains(bucket, key).await)
    }
}
