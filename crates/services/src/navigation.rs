use std::collections::HashSet;

use lesson_core::model::{CourseOutline, Lesson, LessonId, Topic, TopicId};

/// What the session currently displays. A lesson's video and a topic's quiz
/// are mutually exclusive; selecting one clears the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveUnit {
    #[default]
    None,
    Lesson(LessonId),
    Quiz(TopicId),
}

/// Decides what is currently displayed and drives prev/next traversal over
/// the flattened course outline.
///
/// Sidebar expansion state lives here too, but it is independent of
/// activation. A topic can be expanded for browsing without any of its
/// lessons becoming active.
#[derive(Debug, Clone)]
pub struct NavigationController {
    topics: Vec<Topic>,
    outline: CourseOutline,
    expanded: HashSet<TopicId>,
    active: ActiveUnit,
    has_full_access: bool,
}

impl NavigationController {
    #[must_use]
    pub fn new(topics: Vec<Topic>, has_full_access: bool) -> Self {
        let topics: Vec<Topic> = topics.into_iter().map(Topic::normalized).collect();
        let outline = CourseOutline::from_topics(&topics);
        Self {
            topics,
            outline,
            expanded: HashSet::new(),
            active: ActiveUnit::None,
            has_full_access,
        }
    }

    #[must_use]
    pub fn active(&self) -> ActiveUnit {
        self.active
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    #[must_use]
    pub fn outline(&self) -> &CourseOutline {
        &self.outline
    }

    #[must_use]
    pub fn topic(&self, topic_id: TopicId) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    #[must_use]
    pub fn lesson(&self, lesson_id: LessonId) -> Option<&Lesson> {
        self.topics
            .iter()
            .flat_map(|t| t.lessons.iter())
            .find(|l| l.id == lesson_id)
    }

    /// The currently active lesson, if the active unit is a lesson.
    #[must_use]
    pub fn active_lesson(&self) -> Option<&Lesson> {
        match self.active {
            ActiveUnit::Lesson(id) => self.lesson(id),
            _ => None,
        }
    }

    //
    // ─── ACCESS ────────────────────────────────────────────────────────────────
    //

    /// Whether the learner may open a lesson. Free lessons are always open;
    /// the rest require full access.
    #[must_use]
    pub fn is_unlocked(&self, lesson_id: LessonId) -> bool {
        self.lesson(lesson_id)
            .is_some_and(|l| l.is_free || self.has_full_access)
    }

    //
    // ─── SELECTION ─────────────────────────────────────────────────────────────
    //

    /// Makes a lesson the active unit, clearing any active quiz.
    ///
    /// A locked or unknown lesson is a no-op and returns false.
    pub fn select_lesson(&mut self, lesson_id: LessonId) -> bool {
        if !self.is_unlocked(lesson_id) {
            return false;
        }
        self.active = ActiveUnit::Lesson(lesson_id);
        true
    }

    /// Makes a topic's quiz the active unit, clearing any active lesson.
    ///
    /// A topic without questions (or an unknown topic) is a no-op and
    /// returns false.
    pub fn select_quiz(&mut self, topic_id: TopicId) -> bool {
        let Some(topic) = self.topic(topic_id) else {
            return false;
        };
        if !topic.has_quiz() {
            return false;
        }
        self.active = ActiveUnit::Quiz(topic_id);
        true
    }

    /// Returns to the lesson list with nothing active, e.g. on quiz exit.
    pub fn clear_active(&mut self) {
        self.active = ActiveUnit::None;
    }

    //
    // ─── EXPANSION ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn is_expanded(&self, topic_id: TopicId) -> bool {
        self.expanded.contains(&topic_id)
    }

    /// Flips a topic's expanded state; returns the new state.
    pub fn toggle_topic(&mut self, topic_id: TopicId) -> bool {
        if self.expanded.remove(&topic_id) {
            false
        } else {
            self.expanded.insert(topic_id);
            true
        }
    }

    //
    // ─── TRAVERSAL ─────────────────────────────────────────────────────────────
    //

    /// Activates the next unlocked lesson in the flattened outline, wrapping
    /// past the end. Returns the activated lesson id, or `None` when the
    /// outline is empty, no lesson is unlocked, or no lesson is active.
    pub fn next_lesson(&mut self) -> Option<LessonId> {
        self.step(1)
    }

    /// Counterpart of [`next_lesson`](Self::next_lesson), wrapping past the
    /// start.
    pub fn prev_lesson(&mut self) -> Option<LessonId> {
        self.step(-1)
    }

    fn step(&mut self, direction: isize) -> Option<LessonId> {
        let len = self.outline.len();
        if len == 0 {
            return None;
        }
        let ActiveUnit::Lesson(current) = self.active else {
            return None;
        };
        let start = self.outline.position(current)?;

        // Walk at most one full revolution so a fully locked outline stops.
        let mut index = start;
        for _ in 0..len {
            index = (index as isize + direction).rem_euclid(len as isize) as usize;
            let entry = self.outline.entry(index)?;
            if entry.is_free || self.has_full_access {
                let lesson_id = entry.lesson_id;
                self.active = ActiveUnit::Lesson(lesson_id);
                return Some(lesson_id);
            }
        }
        None
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{Answer, AnswerId, MaxChoices, QuestionId, TopicQuestion, UserTopicId};

    fn lesson(id: u64, topic_id: u64, order_index: u32, is_free: bool) -> Lesson {
        Lesson {
            id: LessonId::new(id),
            title: format!("Lesson {id}"),
            description: String::new(),
            content: String::new(),
            video_url: None,
            duration: 10,
            order_index,
            is_free,
            topic_id: TopicId::new(topic_id),
        }
    }

    fn question(id: u64) -> TopicQuestion {
        TopicQuestion {
            id: QuestionId::new(id),
            question: "?".into(),
            max_choices: MaxChoices::Single,
            answers: vec![Answer {
                id: AnswerId::new(1),
                text: "a".into(),
                is_correct: true,
            }],
        }
    }

    fn topic(id: u64, order_index: u32, lessons: Vec<Lesson>, questions: Vec<TopicQuestion>) -> Topic {
        Topic {
            id: TopicId::new(id),
            title: format!("Topic {id}"),
            order_index,
            lessons,
            questions,
            user_topic_id: UserTopicId::new(id),
        }
    }

    /// Two topics, three lessons. Lesson 2 is paid, the rest free.
    fn course() -> Vec<Topic> {
        vec![
            topic(
                1,
                0,
                vec![lesson(1, 1, 0, true), lesson(2, 1, 1, false)],
                vec![question(1)],
            ),
            topic(2, 1, vec![lesson(3, 2, 0, true)], Vec::new()),
        ]
    }

    #[test]
    fn selecting_a_lesson_clears_the_active_quiz() {
        let mut nav = NavigationController::new(course(), true);
        assert!(nav.select_quiz(TopicId::new(1)));
        assert_eq!(nav.active(), ActiveUnit::Quiz(TopicId::new(1)));

        assert!(nav.select_lesson(LessonId::new(1)));
        assert_eq!(nav.active(), ActiveUnit::Lesson(LessonId::new(1)));
    }

    #[test]
    fn selecting_a_quiz_clears_the_active_lesson() {
        let mut nav = NavigationController::new(course(), true);
        nav.select_lesson(LessonId::new(1));
        assert!(nav.select_quiz(TopicId::new(1)));
        assert_eq!(nav.active(), ActiveUnit::Quiz(TopicId::new(1)));
    }

    #[test]
    fn locked_lesson_cannot_become_active() {
        let mut nav = NavigationController::new(course(), false);
        nav.select_lesson(LessonId::new(1));

        assert!(!nav.select_lesson(LessonId::new(2)));
        assert_eq!(nav.active(), ActiveUnit::Lesson(LessonId::new(1)));
    }

    #[test]
    fn full_access_unlocks_paid_lessons() {
        let mut nav = NavigationController::new(course(), true);
        assert!(nav.select_lesson(LessonId::new(2)));
    }

    #[test]
    fn quiz_requires_questions() {
        let mut nav = NavigationController::new(course(), true);
        assert!(!nav.select_quiz(TopicId::new(2)));
        assert!(!nav.select_quiz(TopicId::new(999)));
        assert_eq!(nav.active(), ActiveUnit::None);
    }

    #[test]
    fn next_wraps_past_the_end() {
        let mut nav = NavigationController::new(course(), true);
        nav.select_lesson(LessonId::new(3));

        assert_eq!(nav.next_lesson(), Some(LessonId::new(1)));
        assert_eq!(nav.active(), ActiveUnit::Lesson(LessonId::new(1)));
    }

    #[test]
    fn prev_wraps_past_the_start() {
        let mut nav = NavigationController::new(course(), true);
        nav.select_lesson(LessonId::new(1));

        assert_eq!(nav.prev_lesson(), Some(LessonId::new(3)));
    }

    #[test]
    fn traversal_skips_locked_lessons() {
        let mut nav = NavigationController::new(course(), false);
        nav.select_lesson(LessonId::new(1));

        // Lesson 2 is paid; next lands on lesson 3.
        assert_eq!(nav.next_lesson(), Some(LessonId::new(3)));
        assert_eq!(nav.prev_lesson(), Some(LessonId::new(1)));
    }

    #[test]
    fn traversal_without_an_active_lesson_is_a_noop() {
        let mut nav = NavigationController::new(course(), true);
        assert_eq!(nav.next_lesson(), None);

        nav.select_quiz(TopicId::new(1));
        assert_eq!(nav.next_lesson(), None);
        assert_eq!(nav.active(), ActiveUnit::Quiz(TopicId::new(1)));
    }

    #[test]
    fn empty_outline_is_a_noop() {
        let mut nav = NavigationController::new(Vec::new(), true);
        assert_eq!(nav.next_lesson(), None);
        assert!(!nav.select_lesson(LessonId::new(1)));
    }

    #[test]
    fn expansion_is_independent_of_activation() {
        let mut nav = NavigationController::new(course(), true);
        assert!(!nav.is_expanded(TopicId::new(1)));

        assert!(nav.toggle_topic(TopicId::new(1)));
        assert!(nav.is_expanded(TopicId::new(1)));
        assert_eq!(nav.active(), ActiveUnit::None);

        assert!(!nav.toggle_topic(TopicId::new(1)));
        assert!(!nav.is_expanded(TopicId::new(1)));
    }

    #[test]
    fn outline_orders_by_topic_then_lesson() {
        let nav = NavigationController::new(
            vec![
                topic(2, 1, vec![lesson(3, 2, 0, true)], Vec::new()),
                topic(
                    1,
                    0,
                    vec![lesson(2, 1, 1, true), lesson(1, 1, 0, true)],
                    Vec::new(),
                ),
            ],
            true,
        );
        let ids: Vec<u64> = nav
            .outline()
            .entries()
            .iter()
            .map(|e| e.lesson_id.value())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
