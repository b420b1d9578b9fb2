use std::fmt;

use serde::{Deserialize, Serialize};

/// Read-only usage view handed to the UI. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    pub used: u32,
    pub limit: u32,
    pub limit_reached: bool,
}

impl QuotaSnapshot {
    pub fn new(used: u32, limit: u32) -> Self {
        Self {
            used,
            limit,
            limit_reached: used >= limit,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }
}

impl fmt::Display for QuotaSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} free questions used today",
            self.used, self.limit
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reservation {
    Allowed,
    LimitReached,
}

impl Reservation {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}
