pub mod api;
pub mod config;
pub mod storage;

pub use api::{create_router, ApiState};
pub use config::UsageStoreConfig;
pub use storage::{StorageError, UsageDatabase};
