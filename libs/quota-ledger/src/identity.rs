use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::{StorageProvider, DEVICE_ID_KEY};

/// Stored ids this short are treated as corrupt and replaced.
const MIN_STORED_ID_LEN: usize = 10;

/// Best-effort identifier for one device profile. Used only to bucket
/// usage; it is not a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for display.
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(8)
            .map_or(self.0.as_str(), |(idx, _)| &self.0[..idx])
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct DeviceIdentity {
    storage: Arc<dyn StorageProvider>,
    resolved: OnceLock<DeviceId>,
}

impl DeviceIdentity {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            storage,
            resolved: OnceLock::new(),
        }
    }

    /// Returns the persisted id, creating and storing one on first use. When
    /// storage fails the generated id is kept for this process only.
    pub fn get_or_create(&self) -> DeviceId {
        self.resolved.get_or_init(|| self.load_or_generate()).clone()
    }

    fn load_or_generate(&self) -> DeviceId {
        match self.storage.get(DEVICE_ID_KEY) {
            Ok(Some(existing)) if existing.len() > MIN_STORED_ID_LEN => {
                return DeviceId(existing);
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "device id storage unavailable; using session-only id");
                return DeviceId::generate();
            }
        }

        let id = DeviceId::generate();
        match self.storage.set(DEVICE_ID_KEY, id.as_str()) {
            Ok(()) => debug!(device_id = %id, "created device id"),
            Err(err) => {
                warn!(error = %err, "failed to persist device id; using session-only id")
            }
        }
        id
    }
}
