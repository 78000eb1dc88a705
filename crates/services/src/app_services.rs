use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::Storage;

use crate::authoring_service::AuthoringService;
use crate::error::AppServicesError;
use crate::quiz_service::QuizService;

/// Assembles app-facing services over one question store.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    authoring: Arc<AuthoringService>,
}

impl AppServices {
    /// Build services over an existing `Storage`.
    #[must_use]
    pub fn from_storage(storage: &Storage, seed: Option<u64>) -> Self {
        let quiz = Arc::new(QuizService::new(Arc::clone(&storage.questions)).with_seed(seed));
        let authoring = Arc::new(AuthoringService::new(Arc::clone(&storage.questions)));
        Self { quiz, authoring }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, seed: Option<u64>) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, seed))
    }

    /// Build services backed by a JSON question file.
    #[must_use]
    pub fn new_json_file(path: impl Into<PathBuf>, seed: Option<u64>) -> Self {
        Self::from_storage(&Storage::json_file(path), seed)
    }

    /// Build services over a throwaway in-memory store.
    #[must_use]
    pub fn in_memory(seed: Option<u64>) -> Self {
        Self::from_storage(&Storage::in_memory(), seed)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn authoring(&self) -> Arc<AuthoringService> {
        Arc::clone(&self.authoring)
    }
}
