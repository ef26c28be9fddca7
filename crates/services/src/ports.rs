//! Contracts for the external collaborators this subsystem consumes: the
//! video-playback widget and the remote grading service.

use async_trait::async_trait;

use lesson_core::model::{QuizSubmission, SuggestedLesson};

use crate::error::GradingError;

/// Coarse playback state reported by the widget's "state changed" event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    Playing,
    #[default]
    Paused,
    Ended,
}

/// The embedded video-playback widget.
///
/// The widget lives outside this subsystem; this trait is the slice of its
/// surface the tracker and note services need. `current_time` and `duration`
/// return `None` until the widget has signalled ready.
pub trait VideoWidget: Send + Sync {
    /// Current playback position in seconds.
    fn current_time(&self) -> Option<f64>;

    /// Total video duration in seconds, once known.
    fn duration(&self) -> Option<f64>;

    /// Fire-and-forget seek.
    fn seek_to(&self, position_secs: f64);
}

/// The remote quiz-grading service.
#[async_trait]
pub trait GradingService: Send + Sync {
    /// Submit a completed quiz and receive suggested remediation lessons,
    /// ranked by the service (display order follows the response).
    ///
    /// # Errors
    ///
    /// Returns `GradingError` on transport or protocol failure; callers
    /// degrade to local scoring without suggestions.
    async fn grade(&self, submission: &QuizSubmission)
    -> Result<Vec<SuggestedLesson>, GradingError>;
}
