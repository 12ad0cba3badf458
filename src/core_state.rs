//! Application state shared by every request handler.
//!
//! `CoreState` is built once at startup, wrapped in `Arc`, and handed to the
//! axum router. Everything inside is either immutable or guards its own
//! interior mutability, so handlers never take a lock on the state itself.

use std::sync::Arc;

use rusqlite::Connection;
use tracing::{info, warn};

use crate::advice::{AdviceError, GeminiClient, TextGenerator, TreatmentAdvisor};
use crate::chat::ChatService;
use crate::config::{AppConfig, ConfigError};
use crate::db;
use crate::detection::DiseaseDetector;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: AppConfig,
    pub detector: DiseaseDetector,
    pub advisor: TreatmentAdvisor,
    pub chat: ChatService,
}

impl CoreState {
    /// Build state from configuration, wiring Gemini in when a key is set.
    ///
    /// Constructs a blocking HTTP client: call outside the async runtime.
    pub fn from_config(config: AppConfig) -> Result<Self, CoreError> {
        let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
            Some(key) => {
                let client = GeminiClient::new(
                    &config.gemini_base_url,
                    &config.gemini_model,
                    key,
                    config.gemini_timeout_secs,
                )?;
                info!(model = %config.gemini_model, "Gemini text generation enabled");
                Some(Arc::new(client))
            }
            None => {
                warn!("GEMINI_API_KEY not found in environment variables; AI features will use fallbacks");
                None
            }
        };
        Ok(Self::with_generator(config, generator))
    }

    /// Build state around an explicit generator (or none).
    pub fn with_generator(config: AppConfig, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            detector: DiseaseDetector::new(config.sample_sources.clone()),
            advisor: TreatmentAdvisor::new(generator.clone()),
            chat: ChatService::new(generator, config.chat_session_capacity),
            config,
        }
    }

    /// Whether generative features are live.
    pub fn ai_configured(&self) -> bool {
        self.advisor.is_configured()
    }

    /// Open a fresh connection to the results database.
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        Ok(db::open_database(&self.config.database_path)?)
    }
}

// ═══════════════════════════════════════════════════════════
// CoreError
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Advice service error: {0}")]
    Advice(#[from] AdviceError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
