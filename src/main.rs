use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod llm;
mod schema;
mod sql;
mod storage;
mod util;
mod web;

use crate::config::{AppConfig, CliArgs, LoggingConfig};
use crate::llm::LlmManager;
use crate::storage::{MemStorage, NewUser, Storage};
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging
    init_tracing(&config.logging);

    // Every request acts as the configured default user
    let storage = Arc::new(MemStorage::new());
    let user = storage
        .create_user(NewUser {
            username: config.default_user.username.clone(),
            email: config.default_user.email.clone(),
            password: config.default_user.password.clone(),
        })
        .await?;
    info!("Seeded default user '{}' (id {})", user.username, user.id);

    // Initialize LLM manager
    info!(
        "Initializing LLM manager with backend: {} ({})",
        config.llm.backend, config.llm.model
    );
    let llm_manager = LlmManager::new(&config.llm)?;

    let app_state = Arc::new(AppState::new(
        config.clone(),
        storage,
        llm_manager,
        user.id,
    ));

    // Start the web server
    info!("Starting NL-SQL server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
