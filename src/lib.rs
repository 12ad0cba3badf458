pub mod advice; // Gemini client, treatment prompts and fallbacks
pub mod api; // HTTP router, endpoints, server lifecycle
pub mod chat;
pub mod config;
pub mod core_state;
pub mod db;
pub mod detection; // Feature extraction + heuristic classifier
pub mod models;
pub mod session_cache;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core_state::{CoreError, CoreState};

/// Process entry point: configure logging, build state, serve until Ctrl-C.
pub fn run() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    std::fs::create_dir_all(&config.upload_dir)?;

    // Create the schema up front so a broken database fails at startup
    drop(db::open_database(&config.database_path)?);
    tracing::info!(path = %config.database_path.display(), "Database ready");

    // Built before the runtime exists: the Gemini client is blocking
    let bind_addr = config.bind_addr;
    let core = Arc::new(CoreState::from_config(config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let server = api::start_api_server(core, bind_addr).await?;
        tracing::info!(addr = %server.addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
        server.stop().await;
        Ok::<(), CoreError>(())
    })
}
