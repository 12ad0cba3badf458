//! Chat session cache.
//!
//! Maps an opaque session id to the running conversation with the text
//! generator. Bounded: when full, inserting a new session evicts the
//! least-recently-used one.
//!
//! Key properties:
//! - Sessions exist only in memory and are lost on restart
//! - Every read or append refreshes the session's recency
//! - `capacity` is always at least 1

use std::collections::HashMap;

use crate::advice::ChatTurn;

// ═══════════════════════════════════════════════════════════
// ChatSession
// ═══════════════════════════════════════════════════════════

/// One cached conversation.
#[derive(Debug, Clone)]
struct ChatSession {
    history: Vec<ChatTurn>,
    last_used: u64,
}

// ═══════════════════════════════════════════════════════════
// ChatSessionCache
// ═══════════════════════════════════════════════════════════

pub struct ChatSessionCache {
    sessions: HashMap<String, ChatSession>,
    capacity: usize,
    /// Monotonic recency counter.
    clock: u64,
}

impl ChatSessionCache {
    /// Create an empty cache holding at most `capacity` sessions (min 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Clone of a session's history, refreshing its recency.
    pub fn history(&mut self, session_id: &str) -> Option<Vec<ChatTurn>> {
        let now = self.tick();
        let session = self.sessions.get_mut(session_id)?;
        session.last_used = now;
        Some(session.history.clone())
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Return the cached history for `session_id`, storing `history` first if
    /// the session is absent. An existing session is never replaced.
    ///
    /// The second element is the id evicted to make room, if any.
    pub fn get_or_insert(
        &mut self,
        session_id: &str,
        history: Vec<ChatTurn>,
    ) -> (Vec<ChatTurn>, Option<String>) {
        if let Some(existing) = self.history(session_id) {
            return (existing, None);
        }

        let now = self.tick();
        let evicted = if self.sessions.len() >= self.capacity {
            self.evict_least_recent()
        } else {
            None
        };

        self.sessions.insert(
            session_id.to_string(),
            ChatSession { history: history.clone(), last_used: now },
        );
        (history, evicted)
    }

    /// Append turns to an existing session. Returns false if it is not cached
    /// (for example evicted while a reply was in flight).
    pub fn append(&mut self, session_id: &str, turns: impl IntoIterator<Item = ChatTurn>) -> bool {
        let now = self.tick();
        match self.sessions.get_mut(session_id) {
            Some(session) => {
                session.history.extend(turns);
                session.last_used = now;
                true
            }
            None => false,
        }
    }

    fn evict_least_recent(&mut self) -> Option<String> {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, s)| s.last_used)
            .map(|(id, _)| id.clone())?;
        self.sessions.remove(&oldest);
        tracing::debug!(session_id = %oldest, "Evicted least-recently-used chat session");
        Some(oldest)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
