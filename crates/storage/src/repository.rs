use async_trait::async_trait;
use quiz_core::{Question, QuestionError, QuizName};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::catalog::CatalogStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("bundled question sets are read-only")]
    ReadOnly,

    #[error("invalid question {index}: {source}")]
    Validation {
        index: usize,
        #[source]
        source: QuestionError,
    },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),
}

/// Required-field check shared by every backend before writing.
///
/// # Errors
///
/// Returns `StorageError::Validation` for the first question missing a field.
pub fn validate_for_save(questions: &[Question]) -> Result<(), StorageError> {
    for (index, question) in questions.iter().enumerate() {
        question
            .check_required()
            .map_err(|source| StorageError::Validation { index, source })?;
    }
    Ok(())
}

/// Repository contract for named question sets.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Fetch the questions stored under `name`, in authoring order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn load(&self, name: &QuizName) -> Result<Vec<Question>, StorageError>;

    /// Store a new question set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if `name` is taken and
    /// `StorageError::Validation` if a question misses a required field.
    async fn save(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError>;

    /// Overwrite an existing question set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if `name` does not exist and
    /// `StorageError::Validation` if a question misses a required field.
    async fn replace(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError>;

    /// Remove a question set. Removing a missing set succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn delete(&self, name: &QuizName) -> Result<(), StorageError>;

    /// All stored names, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list(&self) -> Result<Vec<QuizName>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sets: Arc<Mutex<BTreeMap<QuizName, Vec<Question>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sets: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

#[async_trait]
impl QuestionStore for InMemoryRepository {
    async fn load(&self, name: &QuizName) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .sets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(name).cloned().ok_or(StorageError::NotFound)
    }

    async fn save(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError> {
        validate_for_save(questions)?;
        let mut guard = self
            .sets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(name) {
            return Err(StorageError::Conflict);
        }
        guard.insert(name.clone(), questions.to_vec());
        Ok(())
    }

    async fn replace(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError> {
        validate_for_save(questions)?;
        let mut guard = self
            .sets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.get_mut(name) {
            Some(existing) => {
                *existing = questions.to_vec();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn delete(&self, name: &QuizName) -> Result<(), StorageError> {
        let mut guard = self
            .sets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<QuizName>, StorageError> {
        let guard = self
            .sets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.keys().cloned().collect())
    }
}

/// Question store behind a trait object for easy backend swapping.
///
/// Every constructor layers the bundled catalog over the user store.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_user_store(Arc::new(InMemoryRepository::new()))
    }

    #[must_use]
    pub fn with_user_store(user: Arc<dyn QuestionStore>) -> Self {
        let questions: Arc<dyn QuestionStore> = Arc::new(CatalogStore::new(user));
        Self { questions }
    }
}
