use crate::config::AppConfig;
use crate::llm::LlmManager;
use crate::storage::Storage;
use std::sync::Arc;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<dyn Storage>,
    pub llm_manager: LlmManager,
    /// Every API call acts on behalf of this user
    pub default_user_id: i64,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn Storage>,
        llm_manager: LlmManager,
        default_user_id: i64,
    ) -> Self {
        Self {
            config,
            storage,
            llm_manager,
            default_user_id,
            startup_time: chrono::Utc::now(),
        }
    }
}
