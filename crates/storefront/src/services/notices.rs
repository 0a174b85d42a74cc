//! Notice queue.
//!
//! Notices are appended to a JSON array in the visitor's storage and drained
//! by the next page render.

use crate::models::{Notice, session_keys};
use crate::storage::{LocalStorage, StorageError};

/// Queue a notice for the next render.
///
/// # Errors
///
/// Returns an error if the storage cannot be read or written.
pub async fn push(storage: &LocalStorage, notice: Notice) -> Result<(), StorageError> {
    let mut queued = read(storage).await?;
    queued.push(notice);
    storage
        .set_item(session_keys::NOTICES, serde_json::to_string(&queued)?)
        .await
}

/// Drain every queued notice.
///
/// # Errors
///
/// Returns an error if the storage cannot be read or written.
pub async fn take(storage: &LocalStorage) -> Result<Vec<Notice>, StorageError> {
    let queued = read(storage).await?;
    if !queued.is_empty() {
        storage.remove_item(session_keys::NOTICES).await?;
    }
    Ok(queued)
}

async fn read(storage: &LocalStorage) -> Result<Vec<Notice>, StorageError> {
    let Some(raw) = storage.get_item(session_keys::NOTICES).await? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&raw) {
        Ok(notices) => Ok(notices),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed notice queue");
            storage.remove_item(session_keys::NOTICES).await?;
            Ok(Vec::new())
        }
    }
}
