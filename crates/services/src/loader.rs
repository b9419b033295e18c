use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{Question, SessionId};
use tracing::{debug, warn};

use crate::api::QuizApi;
use crate::error::{ApiError, LoadError};

/// Polling policy for a backend that generates questions asynchronously.
///
/// The defaults give roughly ten seconds of patience: enough to cover normal
/// generation latency, bounded so a broken session cannot hang the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    pub retry_delay: Duration,
    pub max_attempts: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(400),
            max_attempts: 25,
        }
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The backend served a question.
    Ready(Question),
    /// The session is over; the caller should end the session.
    Completed,
}

/// Fetches the current question, retrying while the backend is still
/// generating it.
#[derive(Clone)]
pub struct QuestionLoader {
    api: Arc<dyn QuizApi>,
    config: LoaderConfig,
}

impl QuestionLoader {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>) -> Self {
        Self {
            api,
            config: LoaderConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> LoaderConfig {
        self.config
    }

    /// Load the current question for the session.
    ///
    /// "Not generated yet" responses are retried after `retry_delay`, up to
    /// `max_attempts` in total; the retry budget is per call, so a later load
    /// starts fresh. A completed session is not an error.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Unavailable` once the attempt budget is exhausted
    /// (with no further attempt made) and `LoadError::Api` for any
    /// non-transient failure.
    pub async fn load(&self, session_id: &SessionId) -> Result<LoadOutcome, LoadError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.api.current_question(session_id).await {
                Ok(question) => return Ok(LoadOutcome::Ready(question)),
                Err(ApiError::NotGenerated) => {
                    if attempt >= self.config.max_attempts {
                        warn!(%session_id, attempt, "question never became available");
                        return Err(LoadError::Unavailable { attempts: attempt });
                    }
                    debug!(%session_id, attempt, "question not generated yet, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                // a vanished session is treated like a finished one: the
                // caller navigates away, there is nothing to retry
                Err(ApiError::QuizCompleted | ApiError::SessionNotFound) => {
                    return Ok(LoadOutcome::Completed);
                }
                Err(err) => return Err(LoadError::Api(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quiz_core::model::QuestionId;
    use std::sync::Mutex;

    struct ScriptedApi {
        responses: Mutex<Vec<Result<Question, ApiError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedApi {
        fn new(responses: Vec<Result<Question, ApiError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl QuizApi for ScriptedApi {
        async fn start_quiz(
            &self,
            _settings: &crate::api::QuizSettings,
        ) -> Result<SessionId, ApiError> {
            Ok(SessionId::new("scripted"))
        }

        async fn current_question(&self, _session_id: &SessionId) -> Result<Question, ApiError> {
            *self.calls.lock().unwrap() += 1;
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(ApiError::NotGenerated);
            }
            responses.remove(0)
        }

        async fn submit_answer(
            &self,
            _question_id: QuestionId,
            _answer: &str,
            _response_time_secs: u32,
        ) -> Result<quiz_core::model::SubmissionResult, ApiError> {
            unimplemented!("not used in loader tests")
        }
    }

    fn question() -> Question {
        Question::new(
            QuestionId::new(1),
            1,
            5,
            30,
            "Q",
            vec!["a".into(), "b".into()],
            "easy",
            "rust",
            None,
        )
        .unwrap()
    }

    fn fast_config() -> LoaderConfig {
        LoaderConfig {
            retry_delay: Duration::from_millis(1),
            max_attempts: 25,
        }
    }

    #[tokio::test]
    async fn ready_on_first_attempt() {
        let api = Arc::new(ScriptedApi::new(vec![Ok(question())]));
        let loader = QuestionLoader::new(api.clone()).with_config(fast_config());

        let outcome = loader.load(&SessionId::new("s")).await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Ready(_)));
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn transient_responses_are_retried_until_ready() {
        let api = Arc::new(ScriptedApi::new(vec![
            Err(ApiError::NotGenerated),
            Err(ApiError::NotGenerated),
            Ok(question()),
        ]));
        let loader = QuestionLoader::new(api.clone()).with_config(fast_config());

        let outcome = loader.load(&SessionId::new("s")).await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Ready(_)));
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn polling_stops_at_the_attempt_bound() {
        // the scripted api answers NotGenerated forever
        let api = Arc::new(ScriptedApi::new(Vec::new()));
        let loader = QuestionLoader::new(api.clone()).with_config(fast_config());

        let err = loader.load(&SessionId::new("s")).await.unwrap_err();
        assert!(matches!(err, LoadError::Unavailable { attempts: 25 }));
        // exactly 25 attempts, no 26th
        assert_eq!(api.calls(), 25);
    }

    #[tokio::test]
    async fn completed_session_is_not_an_error() {
        let api = Arc::new(ScriptedApi::new(vec![Err(ApiError::QuizCompleted)]));
        let loader = QuestionLoader::new(api).with_config(fast_config());

        let outcome = loader.load(&SessionId::new("s")).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Completed);
    }

    #[tokio::test]
    async fn vanished_session_is_terminal_but_expected() {
        let api = Arc::new(ScriptedApi::new(vec![Err(ApiError::SessionNotFound)]));
        let loader = QuestionLoader::new(api).with_config(fast_config());

        let outcome = loader.load(&SessionId::new("s")).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Completed);
    }

    #[tokio::test]
    async fn unexpected_errors_are_fatal() {
        let api = Arc::new(ScriptedApi::new(vec![Err(ApiError::Status {
            code: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        })]));
        let loader = QuestionLoader::new(api.clone()).with_config(fast_config());

        let err = loader.load(&SessionId::new("s")).await.unwrap_err();
        assert!(matches!(err, LoadError::Api(ApiError::Status { .. })));
        assert_eq!(api.calls(), 1);
    }
}
