#![forbid(unsafe_code)]

pub mod catalog;
pub mod json_file;
pub mod repository;
pub mod sqlite;

pub use catalog::{BUNDLED_SETS, BundledSet, CatalogStore, is_bundled};
pub use json_file::JsonFileStore;
pub use repository::{InMemoryRepository, QuestionStore, Storage, StorageError};
pub use sqlite::{SqliteInitError, SqliteRepository};
