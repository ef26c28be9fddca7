use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::NoteId;

/// Upper bound on note text length, in characters.
pub const MAX_NOTE_LEN: usize = 2000;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum NoteError {
    #[error("note text cannot be empty")]
    EmptyText,

    #[error("note text too long: {len} characters (max {MAX_NOTE_LEN})")]
    TextTooLong { len: usize },

    #[error("note timestamp {time_secs} is outside the lesson video")]
    TimeOutOfRange { time_secs: f64 },
}

//
// ─── NOTE TYPES ────────────────────────────────────────────────────────────────
//

/// Raw input collected from the learner before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub time_secs: f64,
    pub text: String,
}

impl NoteDraft {
    #[must_use]
    pub fn new(time_secs: f64, text: impl Into<String>) -> Self {
        Self {
            time_secs,
            text: text.into(),
        }
    }

    /// Validates the draft against the lesson's duration, when known.
    ///
    /// Text is trimmed; empty or whitespace-only text is rejected, as is a
    /// timestamp that is negative, non-finite, or past the end of the video.
    ///
    /// # Errors
    ///
    /// Returns `NoteError` describing the first failed check.
    pub fn validate(
        self,
        now: DateTime<Utc>,
        duration_secs: Option<f64>,
    ) -> Result<ValidatedNote, NoteError> {
        let text = self.text.trim().to_owned();
        if text.is_empty() {
            return Err(NoteError::EmptyText);
        }
        let len = text.chars().count();
        if len > MAX_NOTE_LEN {
            return Err(NoteError::TextTooLong { len });
        }

        if !self.time_secs.is_finite() || self.time_secs < 0.0 {
            return Err(NoteError::TimeOutOfRange {
                time_secs: self.time_secs,
            });
        }
        if let Some(duration) = duration_secs {
            if duration.is_finite() && self.time_secs > duration {
                return Err(NoteError::TimeOutOfRange {
                    time_secs: self.time_secs,
                });
            }
        }

        Ok(ValidatedNote {
            time_secs: self.time_secs,
            text,
            created_at: now,
        })
    }
}

/// A draft that passed validation but has no id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedNote {
    time_secs: f64,
    text: String,
    created_at: DateTime<Utc>,
}

impl ValidatedNote {
    #[must_use]
    pub fn assign_id(self, id: NoteId) -> Note {
        Note {
            id,
            time_secs: self.time_secs,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

/// A timestamp-anchored note owned by a lesson.
///
/// Notes are never edited in place; an edit is a delete plus recreate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    #[serde(rename = "time")]
    time_secs: f64,
    text: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl Note {
    /// Rehydrates a note from persisted storage, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns `NoteError` if the persisted text or timestamp is invalid,
    /// which callers treat as a corrupt row to skip.
    pub fn from_persisted(
        id: NoteId,
        time_secs: f64,
        text: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, NoteError> {
        let validated = NoteDraft::new(time_secs, text).validate(created_at, None)?;
        Ok(validated.assign_id(id))
    }

    #[must_use]
    pub fn id(&self) -> NoteId {
        self.id
    }

    #[must_use]
    pub fn time_secs(&self) -> f64 {
        self.time_secs
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Sorts notes ascending by timestamp, the order the notes list displays.
pub fn sort_by_time(notes: &mut [Note]) {
    notes.sort_by(|a, b| a.time_secs.total_cmp(&b.time_secs));
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_whitespace_only_text() {
        let err = NoteDraft::new(10.0, "   ")
            .validate(fixed_now(), None)
            .unwrap_err();
        assert_eq!(err, NoteError::EmptyText);
    }

    #[test]
    fn rejects_overlong_text() {
        let err = NoteDraft::new(10.0, "x".repeat(MAX_NOTE_LEN + 1))
            .validate(fixed_now(), None)
            .unwrap_err();
        assert!(matches!(err, NoteError::TextTooLong { .. }));
    }

    #[test]
    fn rejects_time_past_video_end() {
        let err = NoteDraft::new(601.0, "late")
            .validate(fixed_now(), Some(600.0))
            .unwrap_err();
        assert!(matches!(err, NoteError::TimeOutOfRange { .. }));
    }

    #[test]
    fn rejects_negative_and_non_finite_time() {
        assert!(NoteDraft::new(-1.0, "n").validate(fixed_now(), None).is_err());
        assert!(
            NoteDraft::new(f64::NAN, "n")
                .validate(fixed_now(), None)
                .is_err()
        );
    }

    #[test]
    fn valid_draft_trims_and_assigns_id() {
        let id = NoteId::generate();
        let note = NoteDraft::new(42.0, "  remember this  ")
            .validate(fixed_now(), Some(600.0))
            .unwrap()
            .assign_id(id);
        assert_eq!(note.id(), id);
        assert_eq!(note.text(), "remember this");
        assert_eq!(note.time_secs(), 42.0);
        assert_eq!(note.created_at(), fixed_now());
    }

    #[test]
    fn sort_by_time_orders_ascending() {
        let mut notes: Vec<Note> = [30.0, 5.0, 12.0]
            .iter()
            .map(|t| {
                NoteDraft::new(*t, "n")
                    .validate(fixed_now(), None)
                    .unwrap()
                    .assign_id(NoteId::generate())
            })
            .collect();
        sort_by_time(&mut notes);
        let times: Vec<f64> = notes.iter().map(Note::time_secs).collect();
        assert_eq!(times, vec![5.0, 12.0, 30.0]);
    }
}
