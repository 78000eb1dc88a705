use chrono::Utc;
use quiz_core::{Question, QuizName};
use sqlx::{Row, Sqlite, Transaction};

use super::SqliteRepository;
use super::mapping::{map_question_row, options_to_json, position_to_i64};
use crate::repository::{QuestionStore, StorageError, validate_for_save};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

async fn insert_questions(
    tx: &mut Transaction<'_, Sqlite>,
    name: &QuizName,
    questions: &[Question],
) -> Result<(), StorageError> {
    for (position, question) in questions.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO questions (set_name, position, text, options, answer, explanation, example)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(name.as_str())
        .bind(position_to_i64(position)?)
        .bind(question.text())
        .bind(options_to_json(question.options())?)
        .bind(question.answer())
        .bind(question.explanation())
        .bind(question.example())
        .execute(&mut **tx)
        .await
        .map_err(conn)?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl QuestionStore for SqliteRepository {
    async fn load(&self, name: &QuizName) -> Result<Vec<Question>, StorageError> {
        let exists = sqlx::query("SELECT 1 FROM question_sets WHERE name = ?1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        let rows = sqlx::query(
            r"
            SELECT text, options, answer, explanation, example
            FROM questions
            WHERE set_name = ?1
            ORDER BY position ASC
            ",
        )
        .bind(name.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in &rows {
            questions.push(map_question_row(row)?);
        }
        tracing::debug!(set = %name, count = questions.len(), "loaded question set");
        Ok(questions)
    }

    async fn save(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError> {
        validate_for_save(questions)?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
            INSERT INTO question_sets (name, created_at, updated_at)
            VALUES (?1, ?2, ?2)
            ON CONFLICT(name) DO NOTHING
            ",
        )
        .bind(name.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }

        insert_questions(&mut tx, name, questions).await?;
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn replace(&self, name: &QuizName, questions: &[Question]) -> Result<(), StorageError> {
        validate_for_save(questions)?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query("UPDATE question_sets SET updated_at = ?2 WHERE name = ?1")
            .bind(name.as_str())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        sqlx::query("DELETE FROM questions WHERE set_name = ?1")
            .bind(name.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        insert_questions(&mut tx, name, questions).await?;
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn delete(&self, name: &QuizName) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM question_sets WHERE name = ?1")
            .bind(name.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<QuizName>, StorageError> {
        let rows = sqlx::query("SELECT name FROM question_sets ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row
                .try_get("name")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            names.push(
                QuizName::new(raw).map_err(|e| StorageError::Serialization(e.to_string()))?,
            );
        }
        Ok(names)
    }
}
