//! Assistant chat: one Gemini conversation per session id.
//!
//! Builds on top of:
//! - `session_cache::ChatSessionCache` (bounded LRU of conversation histories)
//! - `advice::TextGenerator` (the network call)
//!
//! Every failure is turned into a fixed apology string; `reply` never errors.
//! The cache lock is released before any network call.

use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use crate::advice::prompt::{
    CHAT_EMPTY_REPLY, CHAT_ERROR_REPLY, CHAT_INIT_FAILED_REPLY, CHAT_MISSING_KEY_REPLY,
    CHAT_PRIMING_MESSAGE,
};
use crate::advice::{ChatTurn, TextGenerator};
use crate::session_cache::ChatSessionCache;

// ═══════════════════════════════════════════
// Chat service
// ═══════════════════════════════════════════

pub struct ChatService {
    generator: Option<Arc<dyn TextGenerator>>,
    sessions: Mutex<ChatSessionCache>,
}

impl ChatService {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, capacity: usize) -> Self {
        Self {
            generator,
            sessions: Mutex::new(ChatSessionCache::new(capacity)),
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Reply to `message` within `session_id`, creating the session lazily.
    pub fn reply(&self, session_id: &str, message: &str) -> String {
        let Some(generator) = &self.generator else {
            return CHAT_MISSING_KEY_REPLY.to_string();
        };

        let history = match self.cached_history(session_id) {
            Some(history) => history,
            None => match self.initialize(generator.as_ref(), session_id) {
                Some(history) => history,
                None => return CHAT_INIT_FAILED_REPLY.to_string(),
            },
        };

        match generator.converse(&history, message) {
            Ok(text) if !text.trim().is_empty() => {
                if let Ok(mut sessions) = self.sessions.lock() {
                    sessions.append(session_id, [ChatTurn::user(message), ChatTurn::model(text.as_str())]);
                }
                text
            }
            Ok(_) => {
                warn!(session_id, "Gemini returned an empty chat reply");
                CHAT_EMPTY_REPLY.to_string()
            }
            Err(e) => {
                error!(session_id, error = %e, "Error in chat response");
                CHAT_ERROR_REPLY.to_string()
            }
        }
    }

    fn cached_history(&self, session_id: &str) -> Option<Vec<ChatTurn>> {
        self.sessions.lock().ok()?.history(session_id)
    }

    /// Prime a new session and cache the priming exchange. If a concurrent
    /// request created the session meanwhile, its history wins.
    fn initialize(&self, generator: &dyn TextGenerator, session_id: &str) -> Option<Vec<ChatTurn>> {
        let ack = match generator.generate(CHAT_PRIMING_MESSAGE) {
            Ok(ack) => ack,
            Err(e) => {
                error!(session_id, error = %e, "Error initializing chat");
                return None;
            }
        };

        let primed = vec![ChatTurn::user(CHAT_PRIMING_MESSAGE), ChatTurn::model(ack)];
        let mut sessions = self.sessions.lock().ok()?;
        let (history, evicted) = sessions.get_or_insert(session_id, primed);
        if let Some(evicted) = evicted {
            info!(evicted = %evicted, "Chat session cache full; evicted oldest session");
        }
        info!(session_id, turns = history.len(), "Chat session initialized");
        Some(history)
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
