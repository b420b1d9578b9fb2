use std::sync::Arc;

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::*;
pub use router::create_router;
pub use types::*;

use crate::config::UsageStoreConfig;
use crate::storage::UsageDatabase;

pub struct ApiState {
    pub database: Arc<UsageDatabase>,
    pub config: Arc<UsageStoreConfig>,
}

impl ApiState {
    pub fn new(database: Arc<UsageDatabase>, config: UsageStoreConfig) -> Self {
        Self {
            database,
            config: Arc::new(config),
        }
    }
}
