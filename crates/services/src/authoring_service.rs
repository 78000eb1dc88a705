use std::sync::Arc;

use quiz_core::{Question, QuestionDraft, QuizName, parse_question_set};
use serde::Serialize;
use storage::catalog::find_bundled;
use storage::repository::{QuestionStore, StorageError};

use crate::error::AuthoringError;

/// Row in the list of available question sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizListItem {
    pub name: QuizName,
    pub title: String,
    pub description: Option<String>,
    pub question_count: usize,
    pub bundled: bool,
}

/// Creates, edits and removes question sets.
#[derive(Clone)]
pub struct AuthoringService {
    store: Arc<dyn QuestionStore>,
}

impl AuthoringService {
    #[must_use]
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    /// Validate questions pasted in the authoring JSON format.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Format` naming the offending record.
    pub fn validate_json(&self, json: &str) -> Result<Vec<Question>, AuthoringError> {
        parse_question_set(json).map_err(|e| {
            tracing::warn!(error = %e, "rejected question JSON");
            AuthoringError::Format(e)
        })
    }

    /// Validate `json` and store it as a new set called `name`.
    ///
    /// Returns the number of questions saved.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Format` for malformed input and
    /// `AuthoringError::Conflict` if the name is taken.
    pub async fn create_from_json(
        &self,
        name: &QuizName,
        json: &str,
    ) -> Result<usize, AuthoringError> {
        let questions = self.validate_json(json)?;
        self.store
            .save(name, &questions)
            .await
            .map_err(|e| AuthoringError::for_set(name, e))?;
        tracing::info!(quiz = %name, questions = questions.len(), "created quiz");
        Ok(questions.len())
    }

    /// Questions of a set, in order.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::NotFound` for unknown sets.
    pub async fn questions(&self, name: &QuizName) -> Result<Vec<Question>, AuthoringError> {
        self.store
            .load(name)
            .await
            .map_err(|e| AuthoringError::for_set(name, e))
    }

    /// Append a question from the editor form, creating the set if needed.
    ///
    /// Returns the new number of questions in the set.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Question` for an invalid draft and
    /// `AuthoringError::ReadOnly` for bundled sets.
    pub async fn add_question(
        &self,
        name: &QuizName,
        draft: QuestionDraft,
    ) -> Result<usize, AuthoringError> {
        let question = draft.validate()?;

        let existing = match self.store.load(name).await {
            Ok(questions) => Some(questions),
            Err(StorageError::NotFound) => None,
            Err(e) => return Err(AuthoringError::for_set(name, e)),
        };

        let count = match existing {
            Some(mut questions) => {
                questions.push(question);
                self.store
                    .replace(name, &questions)
                    .await
                    .map_err(|e| AuthoringError::for_set(name, e))?;
                questions.len()
            }
            None => {
                self.store
                    .save(name, std::slice::from_ref(&question))
                    .await
                    .map_err(|e| AuthoringError::for_set(name, e))?;
                1
            }
        };
        tracing::info!(quiz = %name, questions = count, "added question");
        Ok(count)
    }

    /// Remove the question at zero-based `index` and return it.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::IndexOutOfRange` if there is no such question.
    pub async fn delete_question(
        &self,
        name: &QuizName,
        index: usize,
    ) -> Result<Question, AuthoringError> {
        let mut questions = self.questions(name).await?;
        if index >= questions.len() {
            return Err(AuthoringError::IndexOutOfRange {
                index,
                len: questions.len(),
            });
        }
        let removed = questions.remove(index);
        self.store
            .replace(name, &questions)
            .await
            .map_err(|e| AuthoringError::for_set(name, e))?;
        tracing::info!(quiz = %name, index, "deleted question");
        Ok(removed)
    }

    /// Remove a whole set.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::ReadOnly` for bundled sets.
    pub async fn delete_set(&self, name: &QuizName) -> Result<(), AuthoringError> {
        self.store
            .delete(name)
            .await
            .map_err(|e| AuthoringError::for_set(name, e))?;
        tracing::info!(quiz = %name, "deleted quiz");
        Ok(())
    }

    /// Every available set with its question count.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Storage` if the store cannot be read.
    pub async fn list_sets(&self) -> Result<Vec<QuizListItem>, AuthoringError> {
        let names = self.store.list().await?;
        let mut items = Vec::with_capacity(names.len());
        for name in names {
            let question_count = self.questions(&name).await?.len();
            let item = match find_bundled(&name) {
                Some(set) => QuizListItem {
                    title: set.title.to_owned(),
                    description: Some(set.description.to_owned()),
                    question_count,
                    bundled: true,
                    name,
                },
                None => QuizListItem {
                    title: name.to_string(),
                    description: None,
                    question_count,
                    bundled: false,
                    name,
                },
            };
            items.push(item);
        }
        Ok(items)
    }

    /// Pretty JSON in the authoring format, ready to re-import.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::NotFound` for unknown sets.
    pub async fn export_json(&self, name: &QuizName) -> Result<String, AuthoringError> {
        let questions = self.questions(name).await?;
        serde_json::to_string_pretty(&questions).map_err(|e| AuthoringError::Encode(e.to_string()))
    }
}
