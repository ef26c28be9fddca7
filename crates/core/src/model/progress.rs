use serde::{Deserialize, Serialize};

use crate::intervals::{MERGE_TOLERANCE_SECS, WatchedInterval, merge_intervals, percent_watched};
use crate::model::ids::LessonId;

/// Position delta (seconds) beyond which a new sample is treated as a seek
/// rather than continued playback. Deliberately larger than the merge
/// tolerance: samples landing between the two extend the open interval, so a
/// short stall is not mistaken for a jump.
pub const SEEK_JUMP_THRESHOLD_SECS: f64 = 5.0;

/// Resume seeking is only worth doing past this position; reopening a lesson
/// a couple of seconds in just restarts from the top.
pub const RESUME_THRESHOLD_SECS: f64 = 3.0;

/// The interval currently being extended by consecutive playback samples,
/// together with the last sampled position.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenSpan {
    interval: WatchedInterval,
    cursor: f64,
}

/// Everything this device knows about a learner's progress through one
/// lesson's video: the merged watched set, the open sampling span, and the
/// last playback position for resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    lesson_id: LessonId,
    last_position_secs: f64,
    watched: Vec<WatchedInterval>,
    #[serde(skip)]
    open: Option<OpenSpan>,
}

impl LessonProgress {
    /// Fresh progress for a lesson never watched on this device.
    #[must_use]
    pub fn empty(lesson_id: LessonId) -> Self {
        Self {
            lesson_id,
            last_position_secs: 0.0,
            watched: Vec::new(),
            open: None,
        }
    }

    /// Rehydrates progress from the persisted store.
    ///
    /// The stored interval list is re-merged so a partially written or
    /// hand-edited value still satisfies the disjointness invariant, and a
    /// garbage last position degrades to zero. Never fails: store corruption
    /// reads as an empty default.
    #[must_use]
    pub fn from_persisted(
        lesson_id: LessonId,
        last_position_secs: f64,
        watched: Vec<WatchedInterval>,
    ) -> Self {
        let last_position_secs =
            if last_position_secs.is_finite() && last_position_secs >= 0.0 {
                last_position_secs
            } else {
                0.0
            };
        Self {
            lesson_id,
            last_position_secs,
            watched: merge_intervals(&watched, MERGE_TOLERANCE_SECS),
            open: None,
        }
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn last_position_secs(&self) -> f64 {
        self.last_position_secs
    }

    /// Where to seek when the lesson is reopened, if anywhere.
    #[must_use]
    pub fn resume_position(&self) -> Option<f64> {
        (self.last_position_secs > RESUME_THRESHOLD_SECS).then_some(self.last_position_secs)
    }

    /// Records the playback position for resume. Independent of interval
    /// sampling so scrubbing cannot corrupt the watched set.
    pub fn set_last_position(&mut self, position: f64) {
        if position.is_finite() && position >= 0.0 {
            self.last_position_secs = position;
        }
    }

    /// Feeds one playback-position sample into the watched set.
    ///
    /// A sample within [`SEEK_JUMP_THRESHOLD_SECS`] of the previous one
    /// extends the open interval; a larger jump closes it and opens a new one
    /// at the sample. Bad samples (negative, non-finite) are dropped.
    pub fn record_sample(&mut self, position: f64) {
        if !position.is_finite() || position < 0.0 {
            return;
        }
        match &mut self.open {
            None => {
                self.open = Some(OpenSpan {
                    interval: WatchedInterval::at(position),
                    cursor: position,
                });
            }
            Some(span) => {
                if (position - span.cursor).abs() > SEEK_JUMP_THRESHOLD_SECS {
                    let closed = span.interval;
                    self.watched.push(closed);
                    self.watched = merge_intervals(&self.watched, MERGE_TOLERANCE_SECS);
                    span.interval = WatchedInterval::at(position);
                } else {
                    span.interval.extend_to(position);
                }
                span.cursor = position;
            }
        }
    }

    /// Closes the open sampling span. Called when playback pauses, the
    /// lesson is switched away from, or progress is about to be persisted
    /// for the last time.
    pub fn flush(&mut self) {
        if let Some(span) = self.open.take() {
            self.watched.push(span.interval);
            self.watched = merge_intervals(&self.watched, MERGE_TOLERANCE_SECS);
        }
    }

    /// The full merged watched set, including the open span.
    ///
    /// This is what gets persisted after each sample; the stored value is
    /// always a valid merge result.
    #[must_use]
    pub fn watched(&self) -> Vec<WatchedInterval> {
        match self.open {
            None => self.watched.clone(),
            Some(span) => {
                let mut all = self.watched.clone();
                all.push(span.interval);
                merge_intervals(&all, MERGE_TOLERANCE_SECS)
            }
        }
    }

    /// Percent of the video covered, rounded and clamped to 0..=100.
    #[must_use]
    pub fn percent_watched(&self, total_duration_secs: f64) -> u8 {
        percent_watched(&self.watched(), total_duration_secs)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
