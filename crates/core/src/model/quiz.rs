use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

use crate::model::catalog::{MaxChoices, Topic, TopicQuestion};
use crate::model::ids::{AnswerId, CourseId, LessonId, QuestionId, TopicId, UserTopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("topic has no quiz questions")]
    NoQuestions,

    #[error("quiz has not reached the results phase")]
    NotFinished,
}

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a quiz session: intro screen, question stepping, results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Intro,
    InProgress,
    Results,
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Aggregate local score shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub percent: u8,
}

/// Per-question verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub correct: bool,
}

//
// ─── SUBMISSION & SUGGESTIONS ──────────────────────────────────────────────────
//

/// What gets sent to the remote grading service when a session completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub topic_id: TopicId,
    pub user_topic_id: UserTopicId,
    pub answers: BTreeMap<QuestionId, Vec<AnswerId>>,
}

/// A remediation lesson suggested by the grading service. Response-only and
/// ephemeral; display order follows the response order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedLesson {
    pub lesson_id: LessonId,
    pub lesson_title: String,
    pub course_id: CourseId,
    pub course_title: String,
    pub topic_title: String,
    pub wrong_question_count: u32,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session for one topic.
///
/// Ephemeral by design: sessions are created when the learner opens a topic's
/// quiz and discarded on exit or reset, never persisted across reloads.
/// Selection per question keeps insertion order so the capped multi-select
/// policy can evict the oldest pick.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    topic_id: TopicId,
    user_topic_id: UserTopicId,
    questions: Vec<TopicQuestion>,
    current_index: usize,
    selections: HashMap<QuestionId, Vec<AnswerId>>,
    phase: QuizPhase,
    submission_requested: bool,
}

impl QuizSession {
    /// Creates a session over a topic's question set, starting at the intro
    /// screen.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if the topic carries no quiz.
    pub fn new(topic: &Topic) -> Result<Self, QuizError> {
        if topic.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        Ok(Self {
            topic_id: topic.id,
            user_topic_id: topic.user_topic_id,
            questions: topic.questions.clone(),
            current_index: 0,
            selections: HashMap::new(),
            phase: QuizPhase::Intro,
            submission_requested: false,
        })
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    #[must_use]
    pub fn user_topic_id(&self) -> UserTopicId {
        self.user_topic_id
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn questions(&self) -> &[TopicQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&TopicQuestion> {
        self.questions.get(self.current_index)
    }

    /// Selected answer ids for a question, in selection order.
    #[must_use]
    pub fn selected(&self, question_id: QuestionId) -> &[AnswerId] {
        self.selections
            .get(&question_id)
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        !self.selected(question_id).is_empty()
    }

    fn current_answered(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.is_answered(q.id))
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Intro → InProgress at question zero. No-op outside the intro screen.
    pub fn start(&mut self) -> bool {
        if self.phase != QuizPhase::Intro {
            return false;
        }
        self.current_index = 0;
        self.phase = QuizPhase::InProgress;
        true
    }

    /// Applies one answer pick to the question's selection set.
    ///
    /// Single-choice questions replace the whole set (radio semantics);
    /// multi-choice toggles, and a capped question over its limit drops the
    /// oldest pick rather than rejecting the new one. Unknown question or
    /// answer ids, or calls outside `InProgress`, are silent no-ops.
    pub fn select_answer(&mut self, question_id: QuestionId, answer_id: AnswerId) -> bool {
        if self.phase != QuizPhase::InProgress {
            return false;
        }
        let Some(question) = self.questions.iter().find(|q| q.id == question_id) else {
            return false;
        };
        if question.answer(answer_id).is_none() {
            return false;
        }

        let selected = self.selections.entry(question_id).or_default();
        match question.max_choices {
            MaxChoices::Single => {
                selected.clear();
                selected.push(answer_id);
            }
            MaxChoices::Unlimited => {
                toggle(selected, answer_id);
            }
            MaxChoices::Capped(cap) => {
                toggle(selected, answer_id);
                while selected.len() > cap as usize {
                    selected.remove(0);
                }
            }
        }
        true
    }

    /// Advances to the next question. Guarded: the current question must
    /// have at least one selection, and the last question has no "next".
    pub fn next(&mut self) -> bool {
        if self.phase != QuizPhase::InProgress
            || !self.current_answered()
            || self.current_index + 1 >= self.questions.len()
        {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// Steps back one question. Unguarded apart from the floor at zero.
    pub fn prev(&mut self) -> bool {
        if self.phase != QuizPhase::InProgress || self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// Finalizes the session from the last question. No-op unless the
    /// session is in progress, on the last question, with an answer selected.
    pub fn finish(&mut self) -> bool {
        if self.phase != QuizPhase::InProgress
            || self.current_index + 1 != self.questions.len()
            || !self.current_answered()
        {
            return false;
        }
        self.phase = QuizPhase::Results;
        true
    }

    /// Results/InProgress → Intro, clearing all selections and the index.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.selections.clear();
        self.submission_requested = false;
        self.phase = QuizPhase::Intro;
    }

    /// Claims the single grading submission for this completed session.
    ///
    /// Returns true exactly once per completed session; a re-rendered results
    /// view calling again gets false and must not resubmit.
    pub fn mark_submission_requested(&mut self) -> bool {
        if self.phase != QuizPhase::Results || self.submission_requested {
            return false;
        }
        self.submission_requested = true;
        true
    }

    #[must_use]
    pub fn submission_requested(&self) -> bool {
        self.submission_requested
    }

    //
    // ─── SCORING ───────────────────────────────────────────────────────────────
    //

    /// A question is correct iff the selected id set equals the correct id
    /// set exactly. Same size, same members, order irrelevant.
    #[must_use]
    pub fn question_correct(&self, question: &TopicQuestion) -> bool {
        let selected: BTreeSet<AnswerId> = self.selected(question.id).iter().copied().collect();
        selected == question.correct_answer_ids()
    }

    #[must_use]
    pub fn question_results(&self) -> Vec<QuestionResult> {
        self.questions
            .iter()
            .map(|q| QuestionResult {
                question_id: q.id,
                correct: self.question_correct(q),
            })
            .collect()
    }

    /// Local pre-submission score.
    #[must_use]
    pub fn score(&self) -> QuizScore {
        let total = self.questions.len();
        let correct = self
            .questions
            .iter()
            .filter(|q| self.question_correct(q))
            .count();
        let percent = if total == 0 {
            0
        } else {
            // Bounded by construction: correct <= total.
            (100.0 * correct as f64 / total as f64).round() as u8
        };
        QuizScore {
            correct,
            total,
            percent,
        }
    }

    /// Builds the grading-service request for this session's selections.
    #[must_use]
    pub fn submission(&self) -> QuizSubmission {
        let answers = self
            .questions
            .iter()
            .map(|q| (q.id, self.selected(q.id).to_vec()))
            .collect();
        QuizSubmission {
            topic_id: self.topic_id,
            user_topic_id: self.user_topic_id,
            answers,
        }
    }
}

fn toggle(selected: &mut Vec<AnswerId>, answer_id: AnswerId) {
    if let Some(index) = selected.iter().position(|id| *id == answer_id) {
        selected.remove(index);
    } else {
        selected.push(answer_id);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
