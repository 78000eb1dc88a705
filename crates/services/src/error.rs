//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::{FormatError, QuestionError, QuizName, SessionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("quiz `{0}` not found")]
    NotFound(QuizName),
    #[error("option {choice} does not exist (choose 1 to {count})")]
    NoSuchOption { choice: usize, count: usize },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AuthoringService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthoringError {
    #[error("quiz `{0}` not found")]
    NotFound(QuizName),
    #[error("a quiz named `{0}` already exists")]
    Conflict(QuizName),
    #[error("quiz `{0}` is bundled and cannot be edited")]
    ReadOnly(QuizName),
    #[error("question {index} is out of range ({len} questions)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("could not encode questions: {0}")]
    Encode(String),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthoringError {
    /// Attach the set name to storage errors that are about it.
    pub(crate) fn for_set(name: &QuizName, err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound(name.clone()),
            StorageError::Conflict => Self::Conflict(name.clone()),
            StorageError::ReadOnly => Self::ReadOnly(name.clone()),
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
