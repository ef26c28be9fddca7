use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use lesson_core::model::{QuizSubmission, SuggestedLesson};

use crate::error::GradingError;
use crate::ports::GradingService;

/// Remote grading endpoint configuration.
#[derive(Clone, Debug)]
pub struct GraderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl GraderConfig {
    /// Reads `LESSON_GRADER_BASE_URL` (required) and `LESSON_GRADER_API_KEY`
    /// (optional). Returns `None` when the endpoint is not configured, in
    /// which case grading degrades to local scoring only.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("LESSON_GRADER_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let api_key = env::var("LESSON_GRADER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        Some(Self { base_url, api_key })
    }
}

/// HTTP client for the remote quiz-grading service.
#[derive(Clone)]
pub struct GradingClient {
    client: Client,
    config: Option<GraderConfig>,
}

impl GradingClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GraderConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<GraderConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl GradingService for GradingClient {
    async fn grade(
        &self,
        submission: &QuizSubmission,
    ) -> Result<Vec<SuggestedLesson>, GradingError> {
        let config = self.config.as_ref().ok_or(GradingError::NotConfigured)?;

        let url = format!(
            "{}/quiz/submissions",
            config.base_url.trim_end_matches('/')
        );
        let mut request = self.client.post(url).json(submission);
        if let Some(api_key) = &config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(GradingError::HttpStatus(response.status()));
        }

        let body: SubmissionResponse = response.json().await?;
        Ok(body.suggested_lessons)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionResponse {
    suggested_lessons: Vec<SuggestedLesson>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{CourseId, LessonId};

    #[tokio::test]
    async fn unconfigured_client_reports_not_configured() {
        let client = GradingClient::new(None);
        assert!(!client.enabled());

        let submission = QuizSubmission {
            topic_id: lesson_core::model::TopicId::new(1),
            user_topic_id: lesson_core::model::UserTopicId::new(1),
            answers: std::collections::BTreeMap::new(),
        };
        let err = client.grade(&submission).await.unwrap_err();
        assert!(matches!(err, GradingError::NotConfigured));
    }

    #[test]
    fn response_parses_camel_case_suggestions() {
        let json = r#"{
            "suggestedLessons": [{
                "lessonId": 12,
                "lessonTitle": "Borrowing",
                "courseId": 3,
                "courseTitle": "Rust Basics",
                "topicTitle": "Ownership",
                "wrongQuestionCount": 2
            }]
        }"#;
        let body: SubmissionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.suggested_lessons.len(), 1);
        let suggestion = &body.suggested_lessons[0];
        assert_eq!(suggestion.lesson_id, LessonId::new(12));
        assert_eq!(suggestion.course_id, CourseId::new(3));
        assert_eq!(suggestion.wrong_question_count, 2);
    }
}
