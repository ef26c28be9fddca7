use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use lesson_core::intervals::WatchedInterval;
use lesson_core::model::{LessonId, LessonProgress, Note, NoteId, sort_by_time};

/// Errors surfaced by storage adapters.
///
/// Callers in this subsystem treat a missing key as an empty default rather
/// than an error, so `NotFound` only appears on point lookups.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a lesson's playback progress.
///
/// Mirrors the `progress:<lessonId>` value: the resume position plus the
/// merged watched intervals, so repositories can serialize without leaking
/// storage concerns into the domain layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub lesson_id: LessonId,
    pub last_position_secs: f64,
    pub watched_intervals: Vec<WatchedInterval>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_progress(progress: &LessonProgress) -> Self {
        Self {
            lesson_id: progress.lesson_id(),
            last_position_secs: progress.last_position_secs(),
            watched_intervals: progress.watched(),
        }
    }

    /// Convert the record back into domain progress, restoring the merge
    /// invariant. Infallible: garbage values degrade to empty defaults.
    #[must_use]
    pub fn into_progress(self) -> LessonProgress {
        LessonProgress::from_persisted(
            self.lesson_id,
            self.last_position_secs,
            self.watched_intervals,
        )
    }
}

/// Repository contract for per-lesson playback progress.
///
/// Interval writes and last-position writes are separate operations on
/// purpose: they run on independent timers, and scrubbing must not be able
/// to corrupt resume state.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the stored progress for a lesson, `None` when never watched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for real store failures; absent or
    /// unreadable data is `Ok(None)`.
    async fn load_progress(&self, lesson_id: LessonId)
    -> Result<Option<ProgressRecord>, StorageError>;

    /// Persist the merged watched set for a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn save_intervals(
        &self,
        lesson_id: LessonId,
        intervals: &[WatchedInterval],
    ) -> Result<(), StorageError>;

    /// Persist the resume position for a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn save_last_position(
        &self,
        lesson_id: LessonId,
        position_secs: f64,
    ) -> Result<(), StorageError>;
}

/// Repository contract for timestamp-anchored lesson notes.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// All notes for a lesson, sorted ascending by timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails; a lesson with no notes is
    /// an empty list.
    async fn list_notes(&self, lesson_id: LessonId) -> Result<Vec<Note>, StorageError>;

    /// Persist a note under its lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn upsert_note(&self, lesson_id: LessonId, note: &Note) -> Result<(), StorageError>;

    /// Remove a note. Deleting an absent id is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn delete_note(&self, lesson_id: LessonId, note_id: NoteId) -> Result<(), StorageError>;
}

/// Simple in-memory store implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    progress: Arc<Mutex<HashMap<LessonId, ProgressRecord>>>,
    notes: Arc<Mutex<HashMap<LessonId, Vec<Note>>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryStore {
    async fn load_progress(
        &self,
        lesson_id: LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&lesson_id).cloned())
    }

    async fn save_intervals(
        &self,
        lesson_id: LessonId,
        intervals: &[WatchedInterval],
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard.entry(lesson_id).or_insert_with(|| ProgressRecord {
            lesson_id,
            last_position_secs: 0.0,
            watched_intervals: Vec::new(),
        });
        record.watched_intervals = intervals.to_vec();
        Ok(())
    }

    async fn save_last_position(
        &self,
        lesson_id: LessonId,
        position_secs: f64,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard.entry(lesson_id).or_insert_with(|| ProgressRecord {
            lesson_id,
            last_position_secs: 0.0,
            watched_intervals: Vec::new(),
        });
        record.last_position_secs = position_secs;
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for InMemoryStore {
    async fn list_notes(&self, lesson_id: LessonId) -> Result<Vec<Note>, StorageError> {
        let guard = self
            .notes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut notes = guard.get(&lesson_id).cloned().unwrap_or_default();
        sort_by_time(&mut notes);
        Ok(notes)
    }

    async fn upsert_note(&self, lesson_id: LessonId, note: &Note) -> Result<(), StorageError> {
        let mut guard = self
            .notes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let notes = guard.entry(lesson_id).or_default();
        notes.retain(|existing| existing.id() != note.id());
        notes.push(note.clone());
        Ok(())
    }

    async fn delete_note(&self, lesson_id: LessonId, note_id: NoteId) -> Result<(), StorageError> {
        let mut guard = self
            .notes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if let Some(notes) = guard.get_mut(&lesson_id) {
            notes.retain(|note| note.id() != note_id);
        }
        Ok(())
    }
}

/// Aggregates the per-lesson stores behind trait objects for backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub notes: Arc<dyn NoteRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(store.clone());
        let notes: Arc<dyn NoteRepository> = Arc::new(store);
        Self { progress, notes }
    }
}
