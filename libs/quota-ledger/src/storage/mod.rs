//! Device-local key/value storage, the analogue of a browser profile's
//! local storage. Every operation reports failure through [`StorageError`];
//! callers decide whether a failure matters.

pub mod error;
pub mod memory;
pub mod sqlite;

pub use error::StorageError;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub const LOCAL_DB_FILENAME: &str = "device.db";

pub const DEVICE_ID_KEY: &str = "qx_device_id";
pub const DAILY_USAGE_KEY: &str = "qx_daily_usage";
pub const THEME_KEY: &str = "qx_theme";

pub trait StorageProvider: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
