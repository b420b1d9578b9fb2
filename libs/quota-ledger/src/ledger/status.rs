use std::fmt;

use serde::{Deserialize, Serialize};

use crate::remote::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    Remote,
    LocalOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "mode")]
pub enum LedgerPhase {
    Uninitialized,
    Syncing,
    Ready(SyncMode),
}

impl LedgerPhase {
    pub fn mode(self) -> Option<SyncMode> {
        match self {
            Self::Ready(mode) => Some(mode),
            _ => None,
        }
    }
}

/// Short status line shown next to the usage counter. `Idle` renders as an
/// empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Idle,
    Syncing,
    SyncFailed,
    InitFailed,
    SyncError,
    UpdateFailed,
    UpdateError,
    LocalUnavailable,
}

impl SyncStatus {
    pub fn sync_failed(err: &RemoteError) -> Self {
        if err.is_backend_error() {
            Self::SyncFailed
        } else {
            Self::SyncError
        }
    }

    pub fn init_failed(err: &RemoteError) -> Self {
        if err.is_backend_error() {
            Self::InitFailed
        } else {
            Self::SyncError
        }
    }

    pub fn update_failed(err: &RemoteError) -> Self {
        if err.is_backend_error() {
            Self::UpdateFailed
        } else {
            Self::UpdateError
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Syncing => "Syncing usage...",
            Self::SyncFailed => "Usage sync failed (DB).",
            Self::InitFailed => "Usage init failed (DB).",
            Self::SyncError => "Usage sync error.",
            Self::UpdateFailed => "Usage update failed (DB).",
            Self::UpdateError => "Usage update error.",
            Self::LocalUnavailable => "Usage saved for this session only.",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
