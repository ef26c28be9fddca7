use std::sync::Arc;

use tracing::warn;

use lesson_core::model::{Lesson, LessonId, LessonProgress};
use storage::repository::ProgressRepository;

use crate::error::TrackerError;
use crate::ports::{PlayerState, VideoWidget};

//
// ─── ACTIVE LESSON STATE ───────────────────────────────────────────────────────
//

#[derive(Debug)]
struct ActiveLesson {
    lesson_id: LessonId,
    catalog_duration_secs: f64,
    progress: LessonProgress,
    pending_resume: Option<f64>,
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Maintains watched intervals and the resume position for the one active
/// lesson.
///
/// The host drives this with two independent periodic timers, calling
/// [`PlaybackTracker::sample_tick`] (≈ every 2–3 s) and
/// [`PlaybackTracker::position_tick`]. Both ticks read the currently
/// attached lesson at call time, so a tick that fires after a lesson switch
/// writes nothing for the old lesson — [`PlaybackTracker::attach`] and
/// [`PlaybackTracker::detach`] flush the outgoing lesson first.
pub struct PlaybackTracker {
    widget: Arc<dyn VideoWidget>,
    store: Arc<dyn ProgressRepository>,
    player_state: PlayerState,
    active: Option<ActiveLesson>,
}

impl PlaybackTracker {
    #[must_use]
    pub fn new(widget: Arc<dyn VideoWidget>, store: Arc<dyn ProgressRepository>) -> Self {
        Self {
            widget,
            store,
            player_state: PlayerState::default(),
            active: None,
        }
    }

    #[must_use]
    pub fn active_lesson_id(&self) -> Option<LessonId> {
        self.active.as_ref().map(|a| a.lesson_id)
    }

    #[must_use]
    pub fn player_state(&self) -> PlayerState {
        self.player_state
    }

    /// The seek queued for the widget's next ready signal, if any.
    #[must_use]
    pub fn pending_resume(&self) -> Option<f64> {
        self.active.as_ref().and_then(|a| a.pending_resume)
    }

    /// Makes `lesson` the active lesson, flushing any previous one first.
    ///
    /// Persisted progress for the lesson is loaded (absence reads as empty),
    /// and a resume seek is queued when the stored position is far enough in.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if flushing the outgoing lesson or loading the
    /// incoming one fails; the tracker still ends up attached to `lesson`.
    pub async fn attach(&mut self, lesson: &Lesson) -> Result<(), TrackerError> {
        let flushed = self.detach().await;

        let progress = match self.store.load_progress(lesson.id).await? {
            Some(record) => record.into_progress(),
            None => LessonProgress::empty(lesson.id),
        };
        let pending_resume = progress.resume_position();

        self.active = Some(ActiveLesson {
            lesson_id: lesson.id,
            catalog_duration_secs: lesson.catalog_duration_secs(),
            progress,
            pending_resume,
        });
        flushed
    }

    /// Flushes and drops the active lesson; subsequent ticks are no-ops.
    ///
    /// The tracker detaches even when the final writes fail, so a broken
    /// store can never pin writes to a stale lesson id.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if persisting the final state fails.
    pub async fn detach(&mut self) -> Result<(), TrackerError> {
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };
        active.progress.flush();
        self.store
            .save_intervals(active.lesson_id, &active.progress.watched())
            .await?;
        self.store
            .save_last_position(active.lesson_id, active.progress.last_position_secs())
            .await?;
        Ok(())
    }

    /// Widget "ready" notification: fires the queued resume seek, once.
    pub fn notify_ready(&mut self) {
        if let Some(active) = &mut self.active {
            if let Some(position) = active.pending_resume.take() {
                self.widget.seek_to(position);
            }
        }
    }

    /// Widget "state changed" notification.
    ///
    /// Pausing or ending closes the open sampling span and persists, so a
    /// watch session that simply stops still lands in the store.
    pub async fn notify_state(&mut self, state: PlayerState) -> Result<(), TrackerError> {
        self.player_state = state;
        if state == PlayerState::Playing {
            return Ok(());
        }
        let Some(active) = &mut self.active else {
            return Ok(());
        };
        active.progress.flush();
        self.store
            .save_intervals(active.lesson_id, &active.progress.watched())
            .await?;
        Ok(())
    }

    /// Watched-interval timer tick: sample the widget position, fold it into
    /// the watched set, persist. No-op unless a lesson is attached and the
    /// widget is playing.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if persisting the merged set fails.
    pub async fn sample_tick(&mut self) -> Result<(), TrackerError> {
        if self.player_state != PlayerState::Playing {
            return Ok(());
        }
        let Some(active) = &mut self.active else {
            return Ok(());
        };
        let Some(position) = self.widget.current_time() else {
            return Ok(());
        };
        active.progress.record_sample(position);
        self.store
            .save_intervals(active.lesson_id, &active.progress.watched())
            .await?;
        Ok(())
    }

    /// Last-position timer tick: persist the resume position only. Runs on
    /// its own cadence so scrubbing cannot corrupt resume behavior.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the write fails.
    pub async fn position_tick(&mut self) -> Result<(), TrackerError> {
        let Some(active) = &mut self.active else {
            return Ok(());
        };
        let Some(position) = self.widget.current_time() else {
            return Ok(());
        };
        active.progress.set_last_position(position);
        self.store
            .save_last_position(active.lesson_id, active.progress.last_position_secs())
            .await?;
        Ok(())
    }

    /// Percent of the active lesson's video watched.
    ///
    /// Prefers the widget-reported duration, falling back to the catalog's
    /// declared minutes while the widget has not reported one.
    #[must_use]
    pub fn percent_watched(&self) -> u8 {
        let Some(active) = &self.active else {
            return 0;
        };
        let duration = self
            .widget
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(active.catalog_duration_secs);
        active.progress.percent_watched(duration)
    }

    /// Best-effort detach for teardown paths that cannot surface errors.
    pub async fn shutdown(&mut self) {
        if let Err(err) = self.detach().await {
            warn!(error = %err, "failed to flush progress on shutdown");
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
