use std::sync::Arc;

use lesson_core::Clock;
use lesson_core::model::{LessonId, Note, NoteDraft, NoteId};
use storage::repository::NoteRepository;

use crate::error::NoteServiceError;
use crate::ports::VideoWidget;

/// CRUD over timestamp-anchored lesson notes, plus the jump-to-time action.
///
/// All side effects stay inside the per-lesson store; this service never
/// touches the network.
pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
    widget: Arc<dyn VideoWidget>,
    clock: Clock,
}

impl NoteService {
    #[must_use]
    pub fn new(notes: Arc<dyn NoteRepository>, widget: Arc<dyn VideoWidget>, clock: Clock) -> Self {
        Self {
            notes,
            widget,
            clock,
        }
    }

    /// Notes for a lesson, ascending by timestamp.
    ///
    /// # Errors
    ///
    /// Returns `NoteServiceError` if the store read fails.
    pub async fn list(&self, lesson_id: LessonId) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.notes.list_notes(lesson_id).await?)
    }

    /// Validates and persists a new note at `time_secs`.
    ///
    /// The timestamp is bounded by the widget-reported duration when the
    /// widget has one; until then only the non-negative check applies.
    ///
    /// # Errors
    ///
    /// Returns `NoteServiceError::Note` for empty/overlong text or an
    /// out-of-range timestamp, `NoteServiceError::Storage` if the write fails.
    pub async fn add(
        &self,
        lesson_id: LessonId,
        time_secs: f64,
        text: impl Into<String>,
    ) -> Result<Note, NoteServiceError> {
        let note = NoteDraft::new(time_secs, text)
            .validate(self.clock.now(), self.widget.duration())?
            .assign_id(NoteId::generate());
        self.notes.upsert_note(lesson_id, &note).await?;
        Ok(note)
    }

    /// Deletes a note. Absent ids are fine; delete is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `NoteServiceError` if the store write fails.
    pub async fn delete(
        &self,
        lesson_id: LessonId,
        note_id: NoteId,
    ) -> Result<(), NoteServiceError> {
        Ok(self.notes.delete_note(lesson_id, note_id).await?)
    }

    /// Seeks the video widget to a note's timestamp.
    ///
    /// Pure side effect, no data mutation. Returns false when the note no
    /// longer exists.
    ///
    /// # Errors
    ///
    /// Returns `NoteServiceError` if the store read fails.
    pub async fn jump(
        &self,
        lesson_id: LessonId,
        note_id: NoteId,
    ) -> Result<bool, NoteServiceError> {
        let notes = self.notes.list_notes(lesson_id).await?;
        let Some(note) = notes.iter().find(|note| note.id() == note_id) else {
            return Ok(false);
        };
        self.widget.seek_to(note.time_secs());
        Ok(true)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
