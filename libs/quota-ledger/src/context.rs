use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::feedback::FeedbackDesk;
use crate::identity::DeviceIdentity;
use crate::ledger::QuotaLedger;
use crate::local::LocalCounterStore;
use crate::remote::{FeedbackSink, RemoteCounterStore, UsageStoreClient};
use crate::storage::{MemoryStorage, SqliteStorage, StorageProvider};

/// Everything a client window needs, wired from configuration.
pub struct ClientContext {
    pub storage: Arc<dyn StorageProvider>,
    pub identity: Arc<DeviceIdentity>,
    pub ledger: QuotaLedger,
    pub feedback: FeedbackDesk,
}

impl ClientContext {
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &LedgerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let storage: Arc<dyn StorageProvider> = match SqliteStorage::open(&config.data_dir) {
            Ok(storage) => Arc::new(storage),
            Err(err) => {
                warn!(
                    data_dir = %config.data_dir.display(),
                    error = %err,
                    "device storage unavailable; usage is kept in memory"
                );
                Arc::new(MemoryStorage::new())
            }
        };

        let identity = Arc::new(DeviceIdentity::new(Arc::clone(&storage)));
        let ledger = QuotaLedger::new(
            LocalCounterStore::new(Arc::clone(&storage)),
            Arc::clone(&identity),
            clock,
            config.daily_limit,
        );

        let (ledger, sink) = match &config.usage_store_url {
            Some(url) => {
                let client = Arc::new(UsageStoreClient::new(url, config.request_timeout())?);
                info!(url = %url, "usage store configured");
                let remote: Arc<dyn RemoteCounterStore> = client.clone();
                let sink: Arc<dyn FeedbackSink> = client;
                (ledger.with_remote(remote), Some(sink))
            }
            None => {
                warn!("QX_USAGE_STORE_URL not set; usage tracking and feedback stay on this device");
                (ledger, None)
            }
        };

        Ok(Self {
            feedback: FeedbackDesk::new(sink, Arc::clone(&identity)),
            storage,
            identity,
            ledger,
        })
    }
}
