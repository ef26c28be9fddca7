mod catalog;
mod ids;
mod note;
mod progress;
mod quiz;

pub use catalog::{Answer, CourseOutline, Lesson, MaxChoices, OutlineEntry, Topic, TopicQuestion};
pub use ids::{
    AnswerId, CourseId, LessonId, NoteId, ParseIdError, QuestionId, TopicId, UserTopicId,
};
pub use note::{MAX_NOTE_LEN, Note, NoteDraft, NoteError, ValidatedNote, sort_by_time};
pub use progress::{LessonProgress, RESUME_THRESHOLD_SECS, SEEK_JUMP_THRESHOLD_SECS};
pub use quiz::{
    QuestionResult, QuizError, QuizPhase, QuizScore, QuizSession, QuizSubmission, SuggestedLesson,
};
