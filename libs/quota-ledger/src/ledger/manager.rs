use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::identity::{DeviceId, DeviceIdentity};
use crate::local::LocalCounterStore;
use crate::remote::RemoteCounterStore;
use crate::usage::UsageRecord;

use super::snapshot::{QuotaSnapshot, Reservation};
use super::status::{LedgerPhase, SyncMode, SyncStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSync {
    Skipped,
    Synced,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// What the UI showed as soon as the commit was applied.
    pub snapshot: QuotaSnapshot,
    pub persisted: UsageRecord,
    pub local_saved: bool,
    pub remote: RemoteSync,
}

#[derive(Debug)]
struct LedgerState {
    phase: LedgerPhase,
    day: Option<NaiveDate>,
    working: u32,
    status: SyncStatus,
}

struct PendingCommit {
    day: NaiveDate,
    count: u32,
    snapshot: QuotaSnapshot,
}

/// Per-device daily counter. The in-memory working count is authoritative
/// for the session; the local store is written behind it and the remote
/// store, when configured, after that.
#[derive(Clone)]
pub struct QuotaLedger {
    state: Arc<Mutex<LedgerState>>,
    persist_lock: Arc<AsyncMutex<()>>,
    local: Arc<LocalCounterStore>,
    remote: Option<Arc<dyn RemoteCounterStore>>,
    identity: Arc<DeviceIdentity>,
    clock: Arc<dyn Clock>,
    daily_limit: u32,
}

impl QuotaLedger {
    pub fn new(
        local: LocalCounterStore,
        identity: Arc<DeviceIdentity>,
        clock: Arc<dyn Clock>,
        daily_limit: u32,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                phase: LedgerPhase::Uninitialized,
                day: None,
                working: 0,
                status: SyncStatus::Idle,
            })),
            persist_lock: Arc::new(AsyncMutex::new(())),
            local: Arc::new(local),
            remote: None,
            identity,
            clock,
            daily_limit,
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteCounterStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn device_id(&self) -> DeviceId {
        self.identity.get_or_create()
    }

    pub fn phase(&self) -> LedgerPhase {
        self.lock_state().phase
    }

    pub fn status(&self) -> SyncStatus {
        self.lock_state().status
    }

    pub fn status_message(&self) -> String {
        self.status().to_string()
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        let today = self.clock.today();
        let state = self.lock_state();
        QuotaSnapshot::new(used_on(&state, today), self.daily_limit)
    }

    /// Decides whether one more request may be issued. Never waits on I/O
    /// and never changes state.
    pub fn check_and_reserve(&self) -> Reservation {
        if self.snapshot().limit_reached {
            Reservation::LimitReached
        } else {
            Reservation::Allowed
        }
    }

    /// Loads today's count and, with a remote store, adopts the remote row.
    /// Commits made meanwhile are applied in memory and written once the
    /// sync has settled.
    pub async fn initialize(&self) -> QuotaSnapshot {
        let _persisting = self.persist_lock.lock().await;
        let today = self.clock.today();
        let device = self.identity.get_or_create();
        let (stored_count, local_ok) = self.load_local(today);

        let Some(remote) = self.remote.clone() else {
            let mut state = self.lock_state();
            let local_count = stored_count.max(used_on(&state, today));
            state.day = Some(today);
            state.working = local_count;
            state.phase = LedgerPhase::Ready(SyncMode::LocalOnly);
            state.status = if local_ok {
                SyncStatus::Idle
            } else {
                SyncStatus::LocalUnavailable
            };
            info!(day = %today, used = local_count, "quota ledger ready (local only)");
            return QuotaSnapshot::new(local_count, self.daily_limit);
        };

        let local_count = {
            let mut state = self.lock_state();
            let local_count = stored_count.max(used_on(&state, today));
            state.day = Some(today);
            state.working = local_count;
            state.phase = LedgerPhase::Syncing;
            state.status = SyncStatus::Syncing;
            local_count
        };

        let (base, mode, mut status) = match remote.fetch(&device, today).await {
            Ok(Some(record)) => {
                let count = record.count.min(self.daily_limit);
                debug!(device_id = %device, remote = count, local = local_count, "adopting remote usage");
                (count, SyncMode::Remote, SyncStatus::Idle)
            }
            Ok(None) => match remote.create_if_absent(&device, today).await {
                Ok(()) => (local_count, SyncMode::Remote, SyncStatus::Idle),
                Err(err) => {
                    warn!(device_id = %device, error = %err, "failed to seed remote usage row");
                    (local_count, SyncMode::LocalOnly, SyncStatus::init_failed(&err))
                }
            },
            Err(err) => {
                warn!(device_id = %device, error = %err, "failed to fetch remote usage");
                (local_count, SyncMode::LocalOnly, SyncStatus::sync_failed(&err))
            }
        };

        let local_ok = if base != stored_count {
            self.store_local(&UsageRecord::new(today, base))
        } else {
            local_ok
        };
        if !local_ok && status == SyncStatus::Idle {
            status = SyncStatus::LocalUnavailable;
        }

        let mut state = self.lock_state();
        // Commits applied while the fetch was in flight are kept on top of
        // whatever value won; their queued persists write the final count.
        let committed_during_sync = if state.day == Some(today) {
            state.working.saturating_sub(local_count)
        } else {
            0
        };
        state.day = Some(today);
        state.working = base.saturating_add(committed_during_sync).min(self.daily_limit);
        state.phase = LedgerPhase::Ready(mode);
        state.status = status;

        info!(
            day = %today,
            used = state.working,
            mode = ?mode,
            committed_during_sync,
            "quota ledger ready"
        );
        QuotaSnapshot::new(state.working, self.daily_limit)
    }

    /// Records one answered request. The snapshot is updated before any
    /// storage is touched; storage failures only change the status line.
    pub async fn commit(&self) -> CommitOutcome {
        let pending = self.apply_commit();
        self.persist(pending).await
    }

    /// Like [`QuotaLedger::commit`], but returns the updated snapshot right
    /// away and finishes persistence on a background task.
    pub fn spawn_commit(&self) -> (QuotaSnapshot, JoinHandle<CommitOutcome>) {
        let pending = self.apply_commit();
        let snapshot = pending.snapshot;
        let ledger = self.clone();
        let handle = tokio::spawn(async move { ledger.persist(pending).await });
        (snapshot, handle)
    }

    fn apply_commit(&self) -> PendingCommit {
        let today = self.clock.today();
        let mut state = self.lock_state();

        if state.day != Some(today) {
            if let Some(previous) = state.day {
                info!(previous = %previous, day = %today, "day rolled over; usage reset");
            }
            state.day = Some(today);
            state.working = 0;
        }

        state.working = state.working.saturating_add(1).min(self.daily_limit);

        PendingCommit {
            day: today,
            count: state.working,
            snapshot: QuotaSnapshot::new(state.working, self.daily_limit),
        }
    }

    async fn persist(&self, pending: PendingCommit) -> CommitOutcome {
        let _guard = self.persist_lock.lock().await;

        // Memory holds the latest count for the current day. The mode is read
        // at persist time so commits queued behind `initialize` reach the
        // remote store.
        let (count, is_current_day, sync_remote) = {
            let state = self.lock_state();
            let sync_remote = state.phase.mode() == Some(SyncMode::Remote);
            if state.day == Some(pending.day) {
                (state.working, true, sync_remote)
            } else {
                (pending.count, false, sync_remote)
            }
        };
        let record = UsageRecord::new(pending.day, count);

        let local_saved = is_current_day && self.store_local(&record);

        let remote = match (&self.remote, sync_remote) {
            (Some(remote), true) => {
                let device = self.identity.get_or_create();
                match remote.upsert(&device, record.day, record.count).await {
                    Ok(()) => RemoteSync::Synced,
                    Err(err) => {
                        warn!(device_id = %device, count, error = %err, "failed to sync usage");
                        self.set_status(SyncStatus::update_failed(&err));
                        RemoteSync::Failed(err.to_string())
                    }
                }
            }
            _ => RemoteSync::Skipped,
        };

        if !matches!(remote, RemoteSync::Failed(_)) {
            self.set_status(if local_saved || !is_current_day {
                SyncStatus::Idle
            } else {
                SyncStatus::LocalUnavailable
            });
        }

        debug!(day = %record.day, count, local_saved, remote = ?remote, "usage persisted");
        CommitOutcome {
            snapshot: pending.snapshot,
            persisted: record,
            local_saved,
            remote,
        }
    }

    /// Reads today's local count, replacing a missing or stale record with a
    /// zero record for `today`. Returns the count and whether storage worked.
    fn load_local(&self, today: NaiveDate) -> (u32, bool) {
        match self.local.read() {
            Some(record) if record.day == today => {
                (record.clamped(self.daily_limit).count, true)
            }
            Some(stale) => {
                debug!(stale_day = %stale.day, day = %today, "discarding previous day's usage");
                (0, self.store_local(&UsageRecord::empty(today)))
            }
            None => (0, self.store_local(&UsageRecord::empty(today))),
        }
    }

    fn store_local(&self, record: &UsageRecord) -> bool {
        match self.local.write(record) {
            Ok(()) => true,
            Err(err) => {
                warn!(day = %record.day, count = record.count, error = %err, "failed to save local usage");
                false
            }
        }
    }

    fn set_status(&self, status: SyncStatus) {
        self.lock_state().status = status;
    }

    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn used_on(state: &LedgerState, today: NaiveDate) -> u32 {
    match state.day {
        Some(day) if day != today => 0,
        _ => state.working,
    }
}
