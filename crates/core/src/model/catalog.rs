use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

use crate::model::ids::{AnswerId, LessonId, QuestionId, TopicId, UserTopicId};

//
// ─── CATALOG TYPES ─────────────────────────────────────────────────────────────
//

/// A lesson as delivered by the course catalog. Immutable reference data;
/// consumed read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_url: Option<Url>,
    /// Catalog-declared length in minutes; a fallback only, the playback
    /// widget's reported duration wins when available.
    pub duration: u32,
    pub order_index: u32,
    pub is_free: bool,
    pub topic_id: TopicId,
}

impl Lesson {
    /// Catalog duration converted to seconds.
    #[must_use]
    pub fn catalog_duration_secs(&self) -> f64 {
        f64::from(self.duration) * 60.0
    }
}

/// One selectable answer of a quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: AnswerId,
    pub text: String,
    /// Only meaningful once grading data is available; the catalog never
    /// exposes this to the learner before a completed submission.
    pub is_correct: bool,
}

/// Upper bound on simultaneously selected answers for a question.
///
/// The catalog encodes this as a bare integer: `0` means unlimited
/// multi-select, `1` means radio semantics, anything larger caps the
/// selection size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum MaxChoices {
    Single,
    Unlimited,
    Capped(u32),
}

impl From<u32> for MaxChoices {
    fn from(raw: u32) -> Self {
        match raw {
            0 => Self::Unlimited,
            1 => Self::Single,
            cap => Self::Capped(cap),
        }
    }
}

impl From<MaxChoices> for u32 {
    fn from(max: MaxChoices) -> Self {
        match max {
            MaxChoices::Unlimited => 0,
            MaxChoices::Single => 1,
            MaxChoices::Capped(cap) => cap,
        }
    }
}

/// A quiz question belonging to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicQuestion {
    pub id: QuestionId,
    pub question: String,
    pub max_choices: MaxChoices,
    pub answers: Vec<Answer>,
}

impl TopicQuestion {
    /// The set of answer ids flagged correct.
    #[must_use]
    pub fn correct_answer_ids(&self) -> BTreeSet<AnswerId> {
        self.answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.id)
            .collect()
    }

    /// Looks up an answer by id.
    #[must_use]
    pub fn answer(&self, id: AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == id)
    }
}

/// An ordered container of lessons and quiz questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub order_index: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub questions: Vec<TopicQuestion>,
    pub user_topic_id: UserTopicId,
}

impl Topic {
    /// Returns the topic with its lessons sorted by `order_index`.
    ///
    /// The catalog usually delivers them ordered already; this restores the
    /// invariant when it does not.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.lessons.sort_by_key(|lesson| lesson.order_index);
        self
    }

    /// Whether this topic carries a quiz at all.
    #[must_use]
    pub fn has_quiz(&self) -> bool {
        !self.questions.is_empty()
    }
}

//
// ─── COURSE OUTLINE ────────────────────────────────────────────────────────────
//

/// One position in the flattened course outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineEntry {
    pub topic_id: TopicId,
    pub lesson_id: LessonId,
    pub is_free: bool,
}

/// All topics' lessons flattened into a single sequence ordered by
/// `(topic.order_index, lesson.order_index)`. Previous/next traversal and
/// wrap-around are defined over this sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseOutline {
    entries: Vec<OutlineEntry>,
}

impl CourseOutline {
    /// Flattens topics into an ordered outline.
    #[must_use]
    pub fn from_topics(topics: &[Topic]) -> Self {
        let mut sorted: Vec<&Topic> = topics.iter().collect();
        sorted.sort_by_key(|topic| topic.order_index);

        let mut entries = Vec::new();
        for topic in sorted {
            let mut lessons: Vec<&Lesson> = topic.lessons.iter().collect();
            lessons.sort_by_key(|lesson| lesson.order_index);
            for lesson in lessons {
                entries.push(OutlineEntry {
                    topic_id: topic.id,
                    lesson_id: lesson.id,
                    is_free: lesson.is_free,
                });
            }
        }
        Self { entries }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    /// Index of a lesson in the flattened sequence.
    #[must_use]
    pub fn position(&self, lesson_id: LessonId) -> Option<usize> {
        self.entries.iter().position(|e| e.lesson_id == lesson_id)
    }

    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&OutlineEntry> {
        self.entries.get(index)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
