//! Per-session conversation state.
//!
//! Each session identifier owns exactly one `ConversationState`. States are
//! created on first use and dropped on explicit clear. Every state sits
//! behind its own `Mutex`, so turns for one session are serialized while
//! different sessions proceed independently. The outer `RwLock` only
//! guards the id → state map.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::pipeline::{SpecialistReports, ValidatedDiagnosis};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Internal lock error")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// SessionId
// ═══════════════════════════════════════════════════════════

/// Opaque session identifier supplied by the web layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════
// ConversationState
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Label used when replaying history into a prompt.
    pub fn prompt_label(self) -> &'static str {
        match self {
            Self::User => "Human",
            Self::Assistant => "AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    current_diagnosis: Option<ValidatedDiagnosis>,
    specialist_reports: Option<SpecialistReports>,
    history: Vec<DialogueTurn>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent diagnosis for this session, if any.
    pub fn current_diagnosis(&self) -> Option<&ValidatedDiagnosis> {
        self.current_diagnosis.as_ref()
    }

    pub fn specialist_reports(&self) -> Option<&SpecialistReports> {
        self.specialist_reports.as_ref()
    }

    pub fn history(&self) -> &[DialogueTurn] {
        &self.history
    }

    /// Replace the current diagnosis; the previous one is discarded.
    pub fn record_diagnosis(&mut self, diagnosis: ValidatedDiagnosis, reports: SpecialistReports) {
        self.current_diagnosis = Some(diagnosis);
        self.specialist_reports = Some(reports);
    }

    /// Append one user message and the assistant's reply.
    pub fn push_exchange(&mut self, user: &str, assistant: &str) {
        let at = Utc::now();
        self.history.push(DialogueTurn {
            speaker: Speaker::User,
            text: user.to_string(),
            at,
        });
        self.history.push(DialogueTurn {
            speaker: Speaker::Assistant,
            text: assistant.to_string(),
            at,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.current_diagnosis.is_none() && self.specialist_reports.is_none() && self.history.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// SessionStore
// ═══════════════════════════════════════════════════════════

type SharedState = Arc<Mutex<ConversationState>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SharedState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the session's state, creating an empty one on first use.
    pub fn get_or_create(&self, id: &SessionId) -> Result<SharedState, SessionError> {
        {
            let sessions = self.sessions.read().map_err(|_| SessionError::LockPoisoned)?;
            if let Some(state) = sessions.get(id) {
                return Ok(Arc::clone(state));
            }
        }

        let mut sessions = self.sessions.write().map_err(|_| SessionError::LockPoisoned)?;
        let state = sessions.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(session = %id, "Session created");
            Arc::new(Mutex::new(ConversationState::new()))
        });
        Ok(Arc::clone(state))
    }

    /// Run `f` with exclusive access to the session's state.
    ///
    /// The store-wide map lock is released before `f` runs; only this
    /// session's lock is held for the duration.
    pub fn with_session<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut ConversationState) -> R,
    ) -> Result<R, SessionError> {
        let state = self.get_or_create(id)?;
        let mut guard = state.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(f(&mut guard))
    }

    /// Copy of the session's state without creating it.
    pub fn snapshot(&self, id: &SessionId) -> Result<Option<ConversationState>, SessionError> {
        let state = {
            let sessions = self.sessions.read().map_err(|_| SessionError::LockPoisoned)?;
            match sessions.get(id) {
                Some(state) => Arc::clone(state),
                None => return Ok(None),
            }
        };
        let guard = state.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(Some(guard.clone()))
    }

    /// Drop the session's state. Returns whether a state existed.
    pub fn clear(&self, id: &SessionId) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::LockPoisoned)?;
        let removed = sessions.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "Session cleared");
        }
        Ok(removed)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions
            .read()
            .map(|s| s.contains_key(id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
