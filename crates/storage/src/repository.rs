use async_trait::async_trait;
use exam_core::model::{QuestionState, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of an in-progress session.
///
/// This layout is an implementation-visible contract: `answers` maps the
/// 0-based question index (as a string, since the payload is a JSON
/// object) to the selected option, and `bookmarks` lists 0-based
/// bookmarked indices. Any stored value that does not parse into this
/// shape degrades to absent rather than to an error.
///
/// Timer state is deliberately not part of the shape; the countdown is
/// re-armed at the full limit on resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub bookmarks: Vec<usize>,
}

impl SessionSnapshot {
    /// Capture the persistable parts of a session's question states.
    #[must_use]
    pub fn from_states(states: &[QuestionState]) -> Self {
        let mut answers = BTreeMap::new();
        let mut bookmarks = Vec::new();

        for (index, state) in states.iter().enumerate() {
            if let Some(option) = state.selected_option() {
                answers.insert(index.to_string(), option.to_owned());
            }
            if state.bookmarked() {
                bookmarks.push(index);
            }
        }

        Self { answers, bookmarks }
    }

    /// Rebuild question states for a session of `question_count` questions.
    ///
    /// Entries outside the question range are dropped. Review marks are not
    /// part of the persisted shape, so restored answers come back as plain
    /// `Attempted`.
    #[must_use]
    pub fn restore_states(&self, question_count: usize) -> Vec<QuestionState> {
        let mut states = vec![QuestionState::new(); question_count];

        for (key, option) in &self.answers {
            if let Ok(index) = key.parse::<usize>() {
                if let Some(state) = states.get_mut(index) {
                    state.record_answer(option.clone());
                }
            }
        }
        for &index in &self.bookmarks {
            if let Some(state) = states.get_mut(index) {
                state.set_bookmarked(true);
            }
        }

        states
    }
}

/// Repository contract for in-progress session snapshots.
///
/// Writes are last-write-wins per session id. Reads never fail on a
/// corrupt payload; they return `None` and let the session start fresh.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Persist `snapshot` under `session_id`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    async fn save(
        &self,
        session_id: &SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), StorageError>;

    /// Fetch the last-saved snapshot, or `None` when absent or unparseable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself cannot be read.
    async fn load(&self, session_id: &SessionId) -> Result<Option<SessionSnapshot>, StorageError>;

    /// Remove the snapshot for `session_id`. Clearing a missing key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the removal cannot be executed.
    async fn clear(&self, session_id: &SessionId) -> Result<(), StorageError>;
}

/// In-memory snapshot store for testing and single-process sessions.
///
/// Payloads are held as serialized JSON so the corrupt-data path behaves
/// exactly like a real backend.
#[derive(Clone, Default)]
pub struct InMemorySnapshotStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw payload, bypassing serialization. Lets tests exercise
    /// the corrupt-snapshot path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn insert_raw(
        &self,
        session_id: &SessionId,
        payload: impl Into<String>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(session_id.as_str().to_owned(), payload.into());
        Ok(())
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotStore {
    async fn save(
        &self,
        session_id: &SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), StorageError> {
        let payload = serde_json::to_string(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(session_id.as_str().to_owned(), payload);
        Ok(())
    }

    async fn load(&self, session_id: &SessionId) -> Result<Option<SessionSnapshot>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(session_id.as_str())
            .and_then(|payload| serde_json::from_str(payload).ok()))
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(session_id.as_str());
        Ok(())
    }
}
