use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use quiz_core::model::{
    DifficultyShift, Question, QuestionId, SessionId, SessionStats, SubmissionResult,
};

use crate::error::ApiError;

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Parameters for starting a quiz session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSettings {
    pub topic: String,
    pub difficulty: String,
    pub questions_count: u32,
    pub time_per_question: u32,
    pub use_adaptive_difficulty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtopic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_level: Option<String>,
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct StartQuizResponse {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct QuestionDto {
    question_id: i64,
    question_number: u32,
    questions_count: u32,
    time_per_question: u32,
    question_text: String,
    options: Vec<String>,
    difficulty_label: String,
    topic: String,
    #[serde(default)]
    subtopic: Option<String>,
}

impl QuestionDto {
    fn into_question(self) -> Result<Question, ApiError> {
        Ok(Question::new(
            QuestionId::new(self.question_id),
            self.question_number,
            self.questions_count,
            self.time_per_question,
            self.question_text,
            self.options,
            self.difficulty_label,
            self.topic,
            self.subtopic,
        )?)
    }
}

#[derive(Debug, Serialize)]
struct SubmitAnswerRequest<'a> {
    question_id: i64,
    answer: &'a str,
    response_time_seconds: u32,
}

#[derive(Debug, Deserialize)]
struct SubmitAnswerResponse {
    is_correct: bool,
    correct_answer: String,
    explanation: String,
    current_streak: u32,
    difficulty_changed: bool,
    #[serde(default)]
    previous_difficulty: Option<String>,
    #[serde(default)]
    new_difficulty: Option<String>,
    quiz_completed: bool,
    session_stats: SessionStats,
}

impl SubmitAnswerResponse {
    fn into_result(self) -> SubmissionResult {
        let difficulty_shift = if self.difficulty_changed {
            Some(DifficultyShift {
                previous: self.previous_difficulty.unwrap_or_default(),
                new: self.new_difficulty.unwrap_or_default(),
            })
        } else {
            None
        };

        SubmissionResult {
            is_correct: self.is_correct,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            current_streak: self.current_streak,
            difficulty_shift,
            quiz_completed: self.quiz_completed,
            session_stats: self.session_stats,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

//
// ─── CLIENT ────────────────────────────────────────────────────────────────────
//

/// Backend boundary for the quiz-play client.
///
/// Implementations classify backend responses into `ApiError` categories so
/// the loader and controller never see raw transport failures.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Start a session and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend rejects the request.
    async fn start_quiz(&self, settings: &QuizSettings) -> Result<SessionId, ApiError>;

    /// Fetch the current question for a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotGenerated` while the backend is still producing
    /// the question, `ApiError::QuizCompleted` once the session is over, and
    /// other variants for real failures.
    async fn current_question(&self, session_id: &SessionId) -> Result<Question, ApiError>;

    /// Submit an answer for a question.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the submission fails; the caller is responsible
    /// for rolling local state back.
    async fn submit_answer(
        &self,
        question_id: QuestionId,
        answer: &str,
        response_time_secs: u32,
    ) -> Result<SubmissionResult, ApiError>;
}

/// HTTP implementation of `QuizApi` over `reqwest`.
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    base_url: String,
}

impl HttpQuizApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn classify(response: reqwest::Response) -> ApiError {
        let code = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => String::new(),
        };

        if code == StatusCode::NOT_FOUND {
            match message.as_str() {
                "No more questions available" => return ApiError::NotGenerated,
                "Quiz already completed" => return ApiError::QuizCompleted,
                "Session not found" => return ApiError::SessionNotFound,
                _ => {}
            }
        }

        ApiError::Status { code, message }
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn start_quiz(&self, settings: &QuizSettings) -> Result<SessionId, ApiError> {
        let response = self
            .client
            .post(self.url("/quiz/start"))
            .json(settings)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify(response).await);
        }

        let body: StartQuizResponse = response.json().await?;
        Ok(SessionId::new(body.session_id))
    }

    async fn current_question(&self, session_id: &SessionId) -> Result<Question, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/quiz/{session_id}/current-question")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify(response).await);
        }

        let body: QuestionDto = response.json().await?;
        body.into_question()
    }

    async fn submit_answer(
        &self,
        question_id: QuestionId,
        answer: &str,
        response_time_secs: u32,
    ) -> Result<SubmissionResult, ApiError> {
        let payload = SubmitAnswerRequest {
            question_id: question_id.value(),
            answer,
            response_time_seconds: response_time_secs,
        };

        let response = self
            .client
            .post(self.url("/quiz/answer"))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify(response).await);
        }

        let body: SubmitAnswerResponse = response.json().await?;
        Ok(body.into_result())
    }
}
