use std::sync::Arc;

use lesson_core::Clock;
use storage::repository::Storage;

use crate::error::SessionServicesError;
use crate::grading::GradingClient;
use crate::note_service::NoteService;
use crate::playback_tracker::PlaybackTracker;
use crate::ports::{GradingService, VideoWidget};
use crate::quiz_service::QuizLoopService;

/// Assembles the learning-session services around one video widget.
///
/// The playback tracker is owned here rather than shared: it is mutated by
/// the widget event loop and must have exactly one writer. The note and quiz
/// services are stateless and handed out as `Arc` clones.
pub struct SessionServices {
    tracker: PlaybackTracker,
    notes: Arc<NoteService>,
    quiz_loop: Arc<QuizLoopService>,
    grading_enabled: bool,
}

impl SessionServices {
    /// Build services backed by `SQLite` storage, with the grading client
    /// configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `SessionServicesError` if storage initialization fails. A
    /// missing grader configuration is not an error; grading degrades to
    /// local scoring only.
    pub async fn new_sqlite(
        db_url: &str,
        widget: Arc<dyn VideoWidget>,
        clock: Clock,
    ) -> Result<Self, SessionServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let grader = GradingClient::from_env();
        let grading_enabled = grader.enabled();
        Ok(Self::assemble(
            storage,
            widget,
            clock,
            Arc::new(grader),
            grading_enabled,
        ))
    }

    /// Build services on in-memory storage with an injected grader.
    #[must_use]
    pub fn in_memory(
        widget: Arc<dyn VideoWidget>,
        clock: Clock,
        grader: Arc<dyn GradingService>,
    ) -> Self {
        Self::assemble(Storage::in_memory(), widget, clock, grader, true)
    }

    fn assemble(
        storage: Storage,
        widget: Arc<dyn VideoWidget>,
        clock: Clock,
        grader: Arc<dyn GradingService>,
        grading_enabled: bool,
    ) -> Self {
        let tracker = PlaybackTracker::new(Arc::clone(&widget), Arc::clone(&storage.progress));
        let notes = Arc::new(NoteService::new(
            Arc::clone(&storage.notes),
            Arc::clone(&widget),
            clock,
        ));
        let quiz_loop = Arc::new(QuizLoopService::new(grader));
        Self {
            tracker,
            notes,
            quiz_loop,
            grading_enabled,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &PlaybackTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut PlaybackTracker {
        &mut self.tracker
    }

    #[must_use]
    pub fn notes(&self) -> Arc<NoteService> {
        Arc::clone(&self.notes)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    /// Whether a grading endpoint is configured. Lets the results view
    /// suppress the remediation panel up front instead of surfacing an
    /// error for an unconfigured environment.
    #[must_use]
    pub fn grading_enabled(&self) -> bool {
        self.grading_enabled
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::time::fixed_clock;

    use crate::grading::GradingClient;
    use crate::ports::PlayerState;

    struct NullWidget;

    impl VideoWidget for NullWidget {
        fn current_time(&self) -> Option<f64> {
            None
        }

        fn duration(&self) -> Option<f64> {
            None
        }

        fn seek_to(&self, _position_secs: f64) {}
    }

    #[tokio::test]
    async fn in_memory_assembly_wires_all_services() {
        let mut services = SessionServices::in_memory(
            Arc::new(NullWidget),
            fixed_clock(),
            Arc::new(GradingClient::new(None)),
        );

        assert_eq!(services.tracker().player_state(), PlayerState::Paused);
        services
            .tracker_mut()
            .notify_state(PlayerState::Playing)
            .await
            .unwrap();
        assert_eq!(services.tracker().player_state(), PlayerState::Playing);

        let notes = services.notes();
        assert!(notes
            .list(lesson_core::model::LessonId::new(1))
            .await
            .unwrap()
            .is_empty());
    }
}
