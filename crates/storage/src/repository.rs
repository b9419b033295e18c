use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{QuestionId, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted deadline for one question of one session.
///
/// The expiry is a fact about the question, not about any particular render:
/// once created for a key it never changes while it is still in the future.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineRecord {
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub expires_at: DateTime<Utc>,
}

/// Durable store for per-question deadlines, keyed by `(session, question)`.
///
/// This is the one piece of state shared across process restarts; it is what
/// keeps a reload from resetting an in-progress question's clock.
#[async_trait]
pub trait DeadlineStore: Send + Sync {
    /// Return the stored expiry if it is still in the future, otherwise
    /// persist and return `now + budget_secs`.
    ///
    /// At most one live record exists per key, and an unexpired record's
    /// expiry is never rewritten.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read or written.
    async fn resume_or_create(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
        budget_secs: u32,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StorageError>;

    /// Fetch the stored record for a key, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn get(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
    ) -> Result<Option<DeadlineRecord>, StorageError>;

    /// Remove the record for a key. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on write failures.
    async fn clear(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory deadline store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryDeadlineStore {
    records: Arc<Mutex<HashMap<(SessionId, QuestionId), DateTime<Utc>>>>,
}

impl InMemoryDeadlineStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl DeadlineStore for InMemoryDeadlineStore {
    async fn resume_or_create(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
        budget_secs: u32,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let key = (session_id.clone(), question_id);

        if let Some(expiry) = guard.get(&key) {
            if *expiry > now {
                return Ok(*expiry);
            }
        }

        let expiry = now + Duration::seconds(i64::from(budget_secs));
        guard.insert(key, expiry);
        Ok(expiry)
    }

    async fn get(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
    ) -> Result<Option<DeadlineRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(&(session_id.clone(), question_id))
            .map(|expiry| DeadlineRecord {
                session_id: session_id.clone(),
                question_id,
                expires_at: *expiry,
            }))
    }

    async fn clear(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&(session_id.clone(), question_id));
        Ok(())
    }
}

/// Aggregates the deadline store behind a trait object for backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub deadlines: Arc<dyn DeadlineStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            deadlines: Arc::new(InMemoryDeadlineStore::new()),
        }
    }
}
