//! Bundled question sets layered over a user store.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::{Question, QuizName, parse_question_set};

use crate::repository::{QuestionStore, StorageError};

/// A question set compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct BundledSet {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    source: &'static str,
}

impl BundledSet {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the embedded JSON is malformed.
    pub fn questions(&self) -> Result<Vec<Question>, StorageError> {
        parse_question_set(self.source).map_err(|e| {
            StorageError::Serialization(format!("bundled set `{}`: {e}", self.slug))
        })
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the slug is blank.
    pub fn name(&self) -> Result<QuizName, StorageError> {
        QuizName::new(self.slug).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

pub const BUNDLED_SETS: &[BundledSet] = &[
    BundledSet {
        slug: "sql",
        title: "SQL",
        description: "Practice SQL questions.",
        source: include_str!("../data/sql.json"),
    },
    BundledSet {
        slug: "prompt-samples",
        title: "Prompt Samples",
        description: "Pick the better prompt.",
        source: include_str!("../data/prompt_samples.json"),
    },
];

#[must_use]
pub fn find_bundled(name: &QuizName) -> Option<&'static BundledSet> {
    BUNDLED_SETS.iter().find(|set| set.slug == name.as_str())
}

#[must_use]
pub fn is_bundled(name: &QuizName) -> bool {
    find_bundled(name).is_some()
}

/// Serves bundled sets and forwards everything else to the user store.
///
/// Bundled names cannot be saved over, replaced or deleted.
#[derive(Clone)]
pub struct CatalogStore {
    user: Arc<dyn QuestionStore>,
}

impl CatalogStore {
    #[must_use]
    pub fn new(user: Arc<dyn QuestionStore>) -> Self {
        Self { user }
    }
}

#[async_trait]
impl QuestionStore for CatalogStore {
    async fn load(&self, name: &QuizName) -> Result<Vec<Question>, StorageError> {
        match find_bundled(name) {
            Some(set) => set.questions(),
            None => self.user.load(name).await,
        }
    }

    async fn save(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError> {
        if is_bundled(name) {
            return Err(StorageError::Conflict);
        }
        self.user.save(name, questions).await
    }

    async fn replace(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError> {
        if is_bundled(name) {
            return Err(StorageError::ReadOnly);
        }
        self.user.replace(name, questions).await
    }

    async fn delete(&self, name: &QuizName) -> Result<(), StorageError> {
        if is_bundled(name) {
            return Err(StorageError::ReadOnly);
        }
        self.user.delete(name).await
    }

    async fn list(&self) -> Result<Vec<QuizName>, StorageError> {
        let mut names = BTreeSet::new();
        for set in BUNDLED_SETS {
            names.insert(set.name()?);
        }
        names.extend(self.user.list().await?);
        Ok(names.into_iter().collect())
    }
}
