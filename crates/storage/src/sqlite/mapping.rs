use quiz_core::Question;
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Options are stored as a JSON array in a single column.
pub(crate) fn options_to_json(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn options_from_json(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn position_to_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position).map_err(|_| StorageError::Serialization("position overflow".into()))
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let options_raw: String = row.try_get("options").map_err(ser)?;
    let question = Question::new(
        row.try_get::<String, _>("text").map_err(ser)?,
        options_from_json(&options_raw)?,
        row.try_get::<String, _>("answer").map_err(ser)?,
        row.try_get::<String, _>("explanation").map_err(ser)?,
    );

    Ok(match row.try_get::<Option<String>, _>("example").map_err(ser)? {
        Some(example) => question.with_example(example),
        None => question,
    })
}
