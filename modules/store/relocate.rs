use tracing::{info, warn};

use super::{ObjectStore, StoreError, StoreResult};

/// Move an object within a bucket: copy, confirm the copy landed, then delete
/// the source.
///
/// The source is never deleted unless the destination exists. Re-running a
/// relocation that already copied (or already finished) is harmless: a missing
/// source with a present destination counts as done.
pub async fn relocate(
    store: &dyn ObjectStore,
    bucket: &str,
    source_key: &str,
    destination_key: &str,
) -> StoreResult<()> {
    info!("Moving {} to {}", source_key, destination_key);

    match store.copy(bucket, source_key, destination_key).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            if store.exists(bucket, destination_key).await? {
                warn!(
                    "{} is already gone and {} exists, treating move as applied",
                    source_key, destination_key
                );
                return Ok(());
            }
            return Err(e);
        }
        Err(e) => return Err(e),
    }

    if !store.exists(bucket, destination_key).await? {
        return Err(StoreError::CopyNotVerified {
            source_key: source_key.to_string(),
            destination_key: destination_key.to_string(),
        });
    }

    store.delete(bucket, source_key).await
}
