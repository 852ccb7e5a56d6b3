use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::storage::StorageClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<AppConfig>,
    pub storage: StorageClient,
}
