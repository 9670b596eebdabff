//! Per-session conversation history: turn types and the session store.
//!
//! History lives in process memory only (lost on restart) and is keyed by an
//! opaque session id. Distinct session ids are never evicted, so the map can
//! grow without bound across many sessions. Retention trims a single session
//! once it reaches
//! [`RETENTION_TRIGGER`] turns, keeping the first turn plus the most recent
//! [`RETENTION_KEEP_RECENT`].

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// History length at which retention kicks in.
pub const RETENTION_TRIGGER: usize = 20;

/// Number of most-recent turns kept besides the first one.
pub const RETENTION_KEEP_RECENT: usize = 9;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// The coach side (LLM or local fallback).
    Model,
}

/// One immutable chat turn. Order within a session is chronological.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Capability the orchestrator needs from a history backend: get-or-create by
/// session id, append with retention, and a point-in-time snapshot. Backed by
/// memory here; a cache or database implementation can slot in without
/// changing callers.
pub trait SessionStore: Send + Sync {
    /// Append a turn, creating the session when absent, then enforce retention.
    fn append(&self, session_id: &str, turn: ConversationTurn);

    /// Clone of the session history; empty when the session does not exist.
    fn snapshot(&self, session_id: &str) -> Vec<ConversationTurn>;

    /// Number of turns currently held for the session.
    fn len(&self, session_id: &str) -> usize;
}

/// In-memory session store. Last-write-wins on concurrent appends to one
/// session; no locking contract beyond what DashMap provides.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Vec<ConversationTurn>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn append(&self, session_id: &str, turn: ConversationTurn) {
        let mut history = self.sessions.entry(session_id.to_string()).or_default();
        history.push(turn);
        if history.len() >= RETENTION_TRIGGER {
            // Keep the first turn (assumed persona/system turn) + most recent 9.
            let first = history[0].clone();
            let tail_start = history.len() - RETENTION_KEEP_RECENT;
            let mut trimmed = Vec::with_capacity(RETENTION_KEEP_RECENT + 1);
            trimmed.push(first);
            trimmed.extend_from_slice(&history[tail_start..]);
            *history = trimmed;
        }
    }

    fn snapshot(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.sessions
            .get(session_id)
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    fn len(&self, session_id: &str) -> usize {
        self.sessions.get(session_id).map(|h| h.len()).unwrap_or(0)
    }
}
