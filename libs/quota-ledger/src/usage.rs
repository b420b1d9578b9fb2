use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Count of answered questions for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub day: NaiveDate,
    pub count: u32,
}

impl UsageRecord {
    pub fn new(day: NaiveDate, count: u32) -> Self {
        Self { day, count }
    }

    pub fn empty(day: NaiveDate) -> Self {
        Self::new(day, 0)
    }

    pub fn clamped(self, limit: u32) -> Self {
        Self {
            day: self.day,
            count: self.count.min(limit),
        }
    }
}
