//! Daily question quota for the qx client: a per-device counter kept in
//! memory, written behind to device storage and, when configured, to the
//! shared usage store.

pub mod clock;
pub mod config;
pub mod context;
pub mod feedback;
pub mod identity;
pub mod ledger;
pub mod local;
pub mod remote;
pub mod session;
pub mod storage;
pub mod usage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LedgerConfig;
pub use context::ClientContext;
pub use feedback::{FeedbackDesk, FeedbackStatus};
pub use identity::{DeviceId, DeviceIdentity};
pub use ledger::{
    CommitOutcome, LedgerPhase, QuotaLedger, QuotaSnapshot, RemoteSync, Reservation, SyncMode,
    SyncStatus, DEFAULT_DAILY_LIMIT,
};
pub use local::{LocalCounterStore, LocalStoreError};
pub use remote::{FeedbackEntry, FeedbackSink, RemoteCounterStore, RemoteError, UsageStoreClient};
pub use session::{
    AnswerStyle, AskOutcome, Language, Level, Question, Session, SessionState, SolveError,
    SolveRequest, Solver, Theme,
};
pub use storage::{MemoryStorage, SqliteStorage, StorageError, StorageProvider};
pub use usage::UsageRecord;
