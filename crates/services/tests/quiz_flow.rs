//! End-to-end quiz flow: activate a topic's quiz, answer under the choice
//! cap, finish, and submit exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lesson_core::model::{
    Answer, AnswerId, CourseId, LessonId, MaxChoices, QuestionId, QuizPhase, QuizSubmission,
    SuggestedLesson, Topic, TopicId, TopicQuestion, UserTopicId,
};
use services::{ActiveUnit, GradingError, GradingService, NavigationController, QuizLoopService};

struct RecordingGrader {
    calls: AtomicUsize,
}

impl RecordingGrader {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl GradingService for RecordingGrader {
    async fn grade(
        &self,
        submission: &QuizSubmission,
    ) -> Result<Vec<SuggestedLesson>, GradingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(submission.topic_id, TopicId::new(1));
        assert_eq!(submission.user_topic_id, UserTopicId::new(77));
        Ok(vec![SuggestedLesson {
            lesson_id: LessonId::new(4),
            lesson_title: "Review the basics".into(),
            course_id: CourseId::new(1),
            course_title: "Course".into(),
            topic_title: "Topic".into(),
            wrong_question_count: 1,
        }])
    }
}

fn answer(id: u64, is_correct: bool) -> Answer {
    Answer {
        id: AnswerId::new(id),
        text: format!("answer {id}"),
        is_correct,
    }
}

fn quiz_topic() -> Topic {
    Topic {
        id: TopicId::new(1),
        title: "Topic".into(),
        order_index: 0,
        lessons: Vec::new(),
        questions: vec![
            TopicQuestion {
                id: QuestionId::new(1),
                question: "pick one".into(),
                max_choices: MaxChoices::Single,
                answers: vec![answer(1, true), answer(2, false)],
            },
            TopicQuestion {
                id: QuestionId::new(2),
                question: "pick two".into(),
                max_choices: MaxChoices::Capped(2),
                answers: vec![answer(3, true), answer(4, true), answer(5, false)],
            },
        ],
        user_topic_id: UserTopicId::new(77),
    }
}

#[tokio::test]
async fn full_quiz_run_submits_once() {
    let grader = RecordingGrader::new();
    let quiz_loop = QuizLoopService::new(grader.clone());

    let mut nav = NavigationController::new(vec![quiz_topic()], true);
    assert!(nav.select_quiz(TopicId::new(1)));
    let ActiveUnit::Quiz(topic_id) = nav.active() else {
        panic!("quiz should be active");
    };

    let topic = nav.topic(topic_id).cloned().unwrap();
    let mut session = quiz_loop.start_session(&topic).unwrap();
    assert_eq!(session.phase(), QuizPhase::Intro);

    session.start();
    session.select_answer(QuestionId::new(1), AnswerId::new(1));
    assert!(session.next());

    // Three picks under a cap of two: the oldest selection is evicted.
    session.select_answer(QuestionId::new(2), AnswerId::new(5));
    session.select_answer(QuestionId::new(2), AnswerId::new(3));
    session.select_answer(QuestionId::new(2), AnswerId::new(4));

    let outcome = quiz_loop.finish_and_submit(&mut session).await.unwrap();
    assert!(outcome.submitted);
    assert_eq!(outcome.score.correct, 2);
    assert_eq!(outcome.score.percent, 100);
    assert_eq!(outcome.suggestions.unwrap().len(), 1);

    // A re-rendered results view finishing again must not resubmit.
    let again = quiz_loop.finish_and_submit(&mut session).await.unwrap();
    assert!(!again.submitted);
    assert_eq!(grader.calls.load(Ordering::SeqCst), 1);

    // Exiting the quiz hands control back to the lesson list.
    nav.clear_active();
    assert_eq!(nav.active(), ActiveUnit::None);
}
