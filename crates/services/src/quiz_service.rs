use std::sync::Arc;

use tracing::warn;

use lesson_core::model::{
    QuestionResult, QuizPhase, QuizScore, QuizSession, SuggestedLesson, Topic,
};

use crate::error::{GradingError, QuizLoopError};
use crate::ports::GradingService;

/// Everything the results view needs: the local score, per-question
/// verdicts, and the grading service's remediation suggestions (or the
/// non-fatal reason they are missing).
#[derive(Debug)]
pub struct QuizOutcome {
    pub score: QuizScore,
    pub question_results: Vec<QuestionResult>,
    pub suggestions: Result<Vec<SuggestedLesson>, GradingError>,
    /// Whether this call performed the network submission. False on a
    /// repeated finish for the same completed session.
    pub submitted: bool,
}

/// Orchestrates a quiz session's lifecycle against the grading service.
#[derive(Clone)]
pub struct QuizLoopService {
    grader: Arc<dyn GradingService>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(grader: Arc<dyn GradingService>) -> Self {
        Self { grader }
    }

    /// Creates a session for a topic's quiz, parked on the intro screen.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError` if the topic has no questions.
    pub fn start_session(&self, topic: &Topic) -> Result<QuizSession, QuizLoopError> {
        Ok(QuizSession::new(topic)?)
    }

    /// Finalizes the session and submits it for grading, at most once.
    ///
    /// Local scoring always succeeds; a grading failure is folded into the
    /// outcome rather than propagated, so the results view can render the
    /// score and merely omit the remediation panel. Calling again for an
    /// already-submitted session (a re-rendered results view) returns the
    /// score without touching the network.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError` if the session cannot reach the results
    /// phase, e.g. the last question has no selection yet.
    pub async fn finish_and_submit(
        &self,
        session: &mut QuizSession,
    ) -> Result<QuizOutcome, QuizLoopError> {
        if session.phase() == QuizPhase::InProgress {
            session.finish();
        }
        if session.phase() != QuizPhase::Results {
            return Err(lesson_core::model::QuizError::NotFinished.into());
        }

        let score = session.score();
        let question_results = session.question_results();

        if !session.mark_submission_requested() {
            return Ok(QuizOutcome {
                score,
                question_results,
                suggestions: Ok(Vec::new()),
                submitted: false,
            });
        }

        let suggestions = self.grader.grade(&session.submission()).await;
        if let Err(err) = &suggestions {
            warn!(
                topic_id = %session.topic_id(),
                error = %err,
                "quiz grading failed; showing local score only"
            );
        }

        Ok(QuizOutcome {
            score,
            question_results,
            suggestions,
            submitted: true,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
