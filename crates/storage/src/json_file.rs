//! Question sets kept in one JSON object mapping name → question array.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::{Question, QuizName};
use tokio::sync::Mutex;

use crate::repository::{QuestionStore, Storage, StorageError, validate_for_save};

type Book = BTreeMap<String, Vec<Question>>;

fn io<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Io(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Key the book by canonical set names so `list` and `load` agree on a
/// hand-edited file. Blank keys are dropped; of two keys that trim to the same
/// name the first in sort order wins.
fn normalize_keys(raw: Book) -> Book {
    let mut book = Book::new();
    for (key, questions) in raw {
        let Ok(name) = QuizName::new(&key) else {
            tracing::warn!(key = %key, "skipping blank set name in question book");
            continue;
        };
        if book.contains_key(name.as_str()) {
            tracing::warn!(key = %key, "skipping duplicate set name in question book");
            continue;
        }
        book.insert(name.to_string(), questions);
    }
    book
}

/// File-backed store. Writes go through a temp file and a rename so a reader
/// never sees a half-written book.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_book(&self) -> Result<Book, StorageError> {
        let raw: Book = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => return Ok(Book::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(ser)?,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Book::new()),
            Err(e) => return Err(io(e)),
        };
        Ok(normalize_keys(raw))
    }

    async fn write_book(&self, book: &Book) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(book).map_err(ser)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(io)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io)?;
        tracing::debug!(path = %self.path.display(), sets = book.len(), "wrote question book");
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for JsonFileStore {
    async fn load(&self, name: &QuizName) -> Result<Vec<Question>, StorageError> {
        let mut book = self.read_book().await?;
        book.remove(name.as_str()).ok_or(StorageError::NotFound)
    }

    async fn save(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError> {
        validate_for_save(questions)?;
        let _guard = self.write_lock.lock().await;
        let mut book = self.read_book().await?;
        if book.contains_key(name.as_str()) {
            return Err(StorageError::Conflict);
        }
        book.insert(name.to_string(), questions.to_vec());
        self.write_book(&book).await
    }

    async fn replace(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError> {
        validate_for_save(questions)?;
        let _guard = self.write_lock.lock().await;
        let mut book = self.read_book().await?;
        let Some(existing) = book.get_mut(name.as_str()) else {
            return Err(StorageError::NotFound);
        };
        *existing = questions.to_vec();
        self.write_book(&book).await
    }

    async fn delete(&self, name: &QuizName) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut book = self.read_book().await?;
        if book.remove(name.as_str()).is_some() {
            self.write_book(&book).await?;
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<QuizName>, StorageError> {
        let book = self.read_book().await?;
        book.keys()
            .map(|key| QuizName::new(key).map_err(ser))
            .collect()
    }
}

impl Storage {
    /// Build a `Storage` backed by a JSON file at `path`.
    ///
    /// The file is created on first write.
    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::with_user_store(Arc::new(JsonFileStore::new(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn name(s: &str) -> QuizName {
        QuizName::new(s).unwrap()
    }

    fn question(text: &str) -> Question {
        Question::new(text, vec!["A".into(), "B".into()], "B", "because").with_example("e.g.")
    }

    fn store() -> (JsonFileStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("tests.json"));
        (store, dir)
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_book() {
        let (store, _dir) = store();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.load(&name("x")).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn save_persists_across_instances() {
        let (store, _dir) = store();
        store
            .save(&name("mine"), &[question("Q1"), question("Q2")])
            .await
            .unwrap();

        let reopened = JsonFileStore::new(store.path());
        let loaded = reopened.load(&name("mine")).await.unwrap();
        assert_eq!(loaded, vec![question("Q1"), question("Q2")]);
    }

    #[tokio::test]
    async fn file_uses_name_to_array_layout() {
        let (store, _dir) = store();
        store.save(&name("mine"), &[question("Q1")]).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["mine"][0]["question"], "Q1");
        assert_eq!(value["mine"][0]["answer"], "B");
    }

    #[tokio::test]
    async fn conflict_replace_and_delete() {
        let (store, _dir) = store();
        store.save(&name("mine"), &[question("Q1")]).await.unwrap();
        assert!(matches!(
            store.save(&name("mine"), &[question("Q2")]).await,
            Err(StorageError::Conflict)
        ));

        store
            .replace(&name("mine"), &[question("Q1"), question("Q3")])
            .await
            .unwrap();
        assert_eq!(store.load(&name("mine")).await.unwrap().len(), 2);

        store.delete(&name("mine")).await.unwrap();
        store.delete(&name("mine")).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn hand_edited_keys_are_listed_and_loadable() {
        let (store, _dir) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let q = serde_json::to_value(vec![question("Q1")]).unwrap();
        let raw = serde_json::json!({ " mine ": q.clone(), "   ": q });
        std::fs::write(store.path(), raw.to_string()).unwrap();

        let names = store.list().await.unwrap();
        assert_eq!(names, vec![name("mine")]);
        for listed in &names {
            assert_eq!(store.load(listed).await.unwrap(), vec![question("Q1")]);
        }

        // Rewrites persist the trimmed key.
        store.replace(&name("mine"), &[question("Q2")]).await.unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(value["mine"][0]["question"], "Q2");
        assert!(value.get(" mine ").is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let (store, _dir) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(
            store.list().await,
            Err(StorageError::Serialization(_))
        ));
    }
}
