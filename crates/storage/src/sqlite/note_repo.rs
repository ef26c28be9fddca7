use chrono::{DateTime, Utc};
use sqlx::Row;

use lesson_core::model::{LessonId, Note, NoteId};

use super::SqliteStore;
use crate::repository::{NoteRepository, StorageError};

fn lesson_id_i64(lesson_id: LessonId) -> Result<i64, StorageError> {
    i64::try_from(lesson_id.value())
        .map_err(|_| StorageError::Serialization("lesson_id overflow".into()))
}

#[async_trait::async_trait]
impl NoteRepository for SqliteStore {
    async fn list_notes(&self, lesson_id: LessonId) -> Result<Vec<Note>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT note_id, time_secs, text, created_at
            FROM lesson_notes
            WHERE lesson_id = ?1
            ORDER BY time_secs ASC
            ",
        )
        .bind(lesson_id_i64(lesson_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        // Rows that no longer validate (hand-edited store, legacy data) are
        // skipped; a damaged note must not take the whole list down.
        let mut notes = Vec::with_capacity(rows.len());
        for row in rows {
            let Ok(raw_id) = row.try_get::<String, _>("note_id") else {
                continue;
            };
            let Ok(note_id) = raw_id.parse::<NoteId>() else {
                continue;
            };
            let Ok(time_secs) = row.try_get::<f64, _>("time_secs") else {
                continue;
            };
            let Ok(text) = row.try_get::<String, _>("text") else {
                continue;
            };
            let Ok(created_at) = row.try_get::<DateTime<Utc>, _>("created_at") else {
                continue;
            };
            if let Ok(note) = Note::from_persisted(note_id, time_secs, text, created_at) {
                notes.push(note);
            }
        }
        Ok(notes)
    }

    async fn upsert_note(&self, lesson_id: LessonId, note: &Note) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO lesson_notes (lesson_id, note_id, time_secs, text, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(lesson_id, note_id) DO UPDATE SET
                time_secs = excluded.time_secs,
                text = excluded.text,
                created_at = excluded.created_at
            ",
        )
        .bind(lesson_id_i64(lesson_id)?)
        .bind(note.id().to_string())
        .bind(note.time_secs())
        .bind(note.text().to_owned())
        .bind(note.created_at())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn delete_note(&self, lesson_id: LessonId, note_id: NoteId) -> Result<(), StorageError> {
        sqlx::query(
            r"
            DELETE FROM lesson_notes
            WHERE lesson_id = ?1 AND note_id = ?2
            ",
        )
        .bind(lesson_id_i64(lesson_id)?)
        .bind(note_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
