//! Shared usage store reachable over the network. Rows are keyed by
//! `(device_id, day)` and written last-writer-wins.

pub mod client;
pub mod error;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::identity::DeviceId;
use crate::usage::UsageRecord;

pub use client::UsageStoreClient;
pub use error::RemoteError;

#[async_trait]
pub trait RemoteCounterStore: Send + Sync {
    /// `Ok(None)` means no row exists yet for this device and day.
    async fn fetch(
        &self,
        device: &DeviceId,
        day: NaiveDate,
    ) -> Result<Option<UsageRecord>, RemoteError>;

    /// Seeds a zero row. Safe to race from several sessions of one device.
    async fn create_if_absent(&self, device: &DeviceId, day: NaiveDate)
        -> Result<(), RemoteError>;

    /// Overwrites the stored count. No compare-and-swap.
    async fn upsert(&self, device: &DeviceId, day: NaiveDate, count: u32)
        -> Result<(), RemoteError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub device_id: Option<DeviceId>,
    pub message: String,
}

#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn submit(&self, entry: &FeedbackEntry) -> Result<(), RemoteError>;
}
