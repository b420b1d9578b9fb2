pub mod manager;
pub mod snapshot;
pub mod status;

pub use manager::{CommitOutcome, QuotaLedger, RemoteSync};
pub use snapshot::{QuotaSnapshot, Reservation};
pub use status::{LedgerPhase, SyncMode, SyncStatus};

pub const DEFAULT_DAILY_LIMIT: u32 = 10;
