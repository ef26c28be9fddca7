use sqlx::Row;

use lesson_core::intervals::WatchedInterval;
use lesson_core::model::LessonId;

use super::SqliteStore;
use crate::repository::{ProgressRecord, ProgressRepository, StorageError};

fn lesson_id_i64(lesson_id: LessonId) -> Result<i64, StorageError> {
    i64::try_from(lesson_id.value())
        .map_err(|_| StorageError::Serialization("lesson_id overflow".into()))
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteStore {
    async fn load_progress(
        &self,
        lesson_id: LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT last_position_secs, watched_intervals
            FROM lesson_progress
            WHERE lesson_id = ?1
            ",
        )
        .bind(lesson_id_i64(lesson_id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let last_position_secs: f64 = row
            .try_get("last_position_secs")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let raw_intervals: String = row
            .try_get("watched_intervals")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        // A corrupt interval blob degrades to an empty watched set; resume
        // position survives independently.
        let watched_intervals: Vec<WatchedInterval> =
            serde_json::from_str(&raw_intervals).unwrap_or_default();

        Ok(Some(ProgressRecord {
            lesson_id,
            last_position_secs,
            watched_intervals,
        }))
    }

    async fn save_intervals(
        &self,
        lesson_id: LessonId,
        intervals: &[WatchedInterval],
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(intervals)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO lesson_progress (lesson_id, watched_intervals)
            VALUES (?1, ?2)
            ON CONFLICT(lesson_id) DO UPDATE SET
                watched_intervals = excluded.watched_intervals
            ",
        )
        .bind(lesson_id_i64(lesson_id)?)
        .bind(encoded)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn save_last_position(
        &self,
        lesson_id: LessonId,
        position_secs: f64,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO lesson_progress (lesson_id, last_position_secs)
            VALUES (?1, ?2)
            ON CONFLICT(lesson_id) DO UPDATE SET
                last_position_secs = excluded.last_position_secs
            ",
        )
        .bind(lesson_id_i64(lesson_id)?)
        .bind(position_secs.max(0.0))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
