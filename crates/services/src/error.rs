//! Shared error types for the services crate.
//!
//! Every failure is classified at the boundary that produced it; nothing
//! reaches the play controller as a raw transport error.

use thiserror::Error;

use quiz_core::model::{GateRejected, QuestionError};
use storage::repository::StorageError;

/// Errors emitted by the backend API client, already classified.
///
/// `NotGenerated` is transient (the backend is still producing content);
/// `QuizCompleted` and `SessionNotFound` are terminal but expected; the rest
/// are fatal for the current operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("question not generated yet")]
    NotGenerated,

    #[error("quiz already completed")]
    QuizCompleted,

    #[error("session not found")]
    SessionNotFound,

    #[error("backend returned status {code}: {message}")]
    Status {
        code: reqwest::StatusCode,
        message: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("backend sent an invalid question: {0}")]
    Payload(#[from] QuestionError),
}

/// Errors emitted by `QuestionLoader`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The retry budget ran out while the question was still generating.
    /// Not retryable; surfaced to the user as a terminal error.
    #[error("question was still not available after {attempts} attempts")]
    Unavailable { attempts: u32 },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted while committing an answer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("no active question to submit for")]
    NoActiveQuestion,

    /// The backend rejected or failed the submission. Local state has been
    /// rolled back; the selection is preserved and retry is safe.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the play controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayError {
    #[error("session has not been started")]
    SessionNotStarted,

    #[error("no active question")]
    NoActiveQuestion,

    #[error("no answer selected")]
    NoSelection,

    #[error(transparent)]
    Rejected(#[from] GateRejected),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
