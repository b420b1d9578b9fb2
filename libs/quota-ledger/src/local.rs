use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::storage::{StorageError, StorageProvider, DAILY_USAGE_KEY};
use crate::usage::UsageRecord;

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("local storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to encode usage record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The `{day, count}` blob kept in device storage.
pub struct LocalCounterStore {
    storage: Arc<dyn StorageProvider>,
}

impl LocalCounterStore {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self { storage }
    }

    /// Returns the stored record, whatever day it belongs to. Storage errors
    /// and unreadable blobs count as "no record".
    pub fn read(&self) -> Option<UsageRecord> {
        let raw = match self.storage.get(DAILY_USAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "local usage unavailable");
                return None;
            }
        };

        match serde_json::from_str::<UsageRecord>(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(error = %err, "discarding unreadable local usage record");
                None
            }
        }
    }

    pub fn write(&self, record: &UsageRecord) -> Result<(), LocalStoreError> {
        let encoded = serde_json::to_string(record)?;
        self.storage.set(DAILY_USAGE_KEY, &encoded)?;
        Ok(())
    }
}
