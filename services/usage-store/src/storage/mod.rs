pub mod database;
pub mod error;
pub mod schema;

pub use database::{FeedbackRecord, UsageDatabase, UsageRow};
pub use error::StorageError;

pub const USAGE_DB_FILENAME: &str = "usage.db";
pub const DAILY_USAGE_TABLE: &str = "daily_usage";
pub const FEEDBACK_TABLE: &str = "feedback";
