use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use qx_quota_ledger::{
    DeviceId, DeviceIdentity, LocalCounterStore, ManualClock, MemoryStorage, QuotaLedger,
    RemoteCounterStore, RemoteError, StorageError, StorageProvider, UsageRecord,
    DEFAULT_DAILY_LIMIT,
};
use tokio::sync::Semaphore;

pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

pub const TODAY: &str = "2026-10-19";
#[allow(dead_code)]
pub const YESTERDAY: &str = "2026-10-18";

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Unreachable,
    Rejected,
}

#[allow(dead_code)]
impl Failure {
    fn error(self) -> RemoteError {
        match self {
            Failure::Unreachable => RemoteError::Unreachable("connection refused".into()),
            Failure::Rejected => RemoteError::Rejected {
                status: 500,
                body: "database unavailable".into(),
            },
        }
    }
}

/// In-memory `daily_usage` table with switchable failures.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeRemote {
    rows: Mutex<HashMap<(String, NaiveDate), u32>>,
    failure: Mutex<Option<Failure>>,
    pub fetch_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub upsert_calls: AtomicUsize,
    fetch_gate: Option<Arc<Semaphore>>,
    upsert_gate: Option<Arc<Semaphore>>,
}

#[allow(dead_code)]
impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: Failure) -> Self {
        let remote = Self::default();
        remote.fail_with(Some(failure));
        remote
    }

    /// Upserts block until a permit is added to the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let remote = Self {
            upsert_gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (remote, gate)
    }

    /// Fetches block until a permit is added to the returned semaphore.
    pub fn fetch_gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let remote = Self {
            fetch_gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (remote, gate)
    }

    pub fn fail_with(&self, failure: Option<Failure>) {
        *self.failure.lock().unwrap() = failure;
    }

    pub fn set_row(&self, device: &DeviceId, day: NaiveDate, count: u32) {
        self.rows
            .lock()
            .unwrap()
            .insert((device.as_str().to_string(), day), count);
    }

    pub fn row(&self, device: &DeviceId, day: NaiveDate) -> Option<u32> {
        self.rows
            .lock()
            .unwrap()
            .get(&(device.as_str().to_string(), day))
            .copied()
    }

    fn check(&self) -> Result<(), RemoteError> {
        match *self.failure.lock().unwrap() {
            Some(failure) => Err(failure.error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteCounterStore for FakeRemote {
    async fn fetch(
        &self,
        device: &DeviceId,
        day: NaiveDate,
    ) -> Result<Option<UsageRecord>, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.fetch_gate {
            gate.acquire().await.expect("gate open").forget();
        }
        self.check()?;
        Ok(self
            .row(device, day)
            .map(|count| UsageRecord::new(day, count)))
    }

    async fn create_if_absent(&self, device: &DeviceId, day: NaiveDate) -> Result<(), RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .entry((device.as_str().to_string(), day))
            .or_insert(0);
        Ok(())
    }

    async fn upsert(&self, device: &DeviceId, day: NaiveDate, count: u32) -> Result<(), RemoteError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.upsert_gate {
            gate.acquire().await.expect("gate open").forget();
        }
        self.check()?;
        self.set_row(device, day, count);
        Ok(())
    }
}

/// Storage that refuses every read and write.
#[allow(dead_code)]
pub struct BrokenStorage;

impl StorageProvider for BrokenStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }
}

pub struct Fixture {
    pub storage: Arc<dyn StorageProvider>,
    pub identity: Arc<DeviceIdentity>,
    pub clock: Arc<ManualClock>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    pub fn with_storage(storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            identity: Arc::new(DeviceIdentity::new(Arc::clone(&storage))),
            clock: Arc::new(ManualClock::new(day(TODAY))),
            storage,
        }
    }

    #[allow(dead_code)]
    pub fn device(&self) -> DeviceId {
        self.identity.get_or_create()
    }

    pub fn local(&self) -> LocalCounterStore {
        LocalCounterStore::new(Arc::clone(&self.storage))
    }

    pub fn ledger(&self) -> QuotaLedger {
        QuotaLedger::new(
            self.local(),
            Arc::clone(&self.identity),
            self.clock.clone(),
            DEFAULT_DAILY_LIMIT,
        )
    }

    #[allow(dead_code)]
    pub fn remote_ledger(&self, remote: Arc<FakeRemote>) -> QuotaLedger {
        self.ledger().with_remote(remote)
    }

    #[allow(dead_code)]
    pub fn remote_ledger_with(&self, remote: Arc<dyn RemoteCounterStore>) -> QuotaLedger {
        self.ledger().with_remote(remote)
    }
}
