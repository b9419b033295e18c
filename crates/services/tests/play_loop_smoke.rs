use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use quiz_core::model::{
    Question, QuestionId, SessionId, SessionStats, SubmissionResult,
};
use quiz_core::time::fixed_now;
use services::{ApiError, Clock, PlayController, QuizApi, QuizSettings, SubmitOutcome};
use storage::repository::InMemoryDeadlineStore;

/// Backend double that serves a fixed question list and grades answer "a"
/// as correct.
struct FixedQuizApi {
    questions: Vec<Question>,
    cursor: Mutex<usize>,
    streak: Mutex<u32>,
}

impl FixedQuizApi {
    fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            cursor: Mutex::new(0),
            streak: Mutex::new(0),
        }
    }
}

#[async_trait]
impl QuizApi for FixedQuizApi {
    async fn start_quiz(&self, _settings: &QuizSettings) -> Result<SessionId, ApiError> {
        Ok(SessionId::new("smoke-session"))
    }

    async fn current_question(&self, _session_id: &SessionId) -> Result<Question, ApiError> {
        let cursor = self.cursor.lock().unwrap();
        match self.questions.get(*cursor) {
            Some(question) => Ok(question.clone()),
            None => Err(ApiError::QuizCompleted),
        }
    }

    async fn submit_answer(
        &self,
        _question_id: QuestionId,
        answer: &str,
        _response_time_secs: u32,
    ) -> Result<SubmissionResult, ApiError> {
        let mut cursor = self.cursor.lock().unwrap();
        *cursor += 1;
        let answered = u32::try_from(*cursor).unwrap();
        let total = u32::try_from(self.questions.len()).unwrap();

        let is_correct = answer == "a";
        let mut streak = self.streak.lock().unwrap();
        *streak = if is_correct { *streak + 1 } else { 0 };

        Ok(SubmissionResult {
            is_correct,
            correct_answer: "a".into(),
            explanation: "a is always right here".into(),
            current_streak: *streak,
            difficulty_shift: None,
            quiz_completed: answered == total,
            session_stats: SessionStats {
                questions_answered: answered,
                correct_count: *streak,
                accuracy_percent: 100.0,
                best_streak: *streak,
            },
        })
    }
}

fn question(id: i64, number: u32, count: u32) -> Question {
    Question::new(
        QuestionId::new(id),
        number,
        count,
        30,
        format!("Question {number}"),
        vec!["a".into(), "b".into()],
        "medium",
        "rust",
        None,
    )
    .unwrap()
}

fn settings() -> QuizSettings {
    QuizSettings {
        topic: "rust".into(),
        difficulty: "medium".into(),
        questions_count: 2,
        time_per_question: 30,
        use_adaptive_difficulty: false,
        subtopic: None,
        knowledge_level: None,
    }
}

#[tokio::test]
async fn play_through_a_whole_session() {
    let api = Arc::new(FixedQuizApi::new(vec![
        question(1, 1, 2),
        question(2, 2, 2),
    ]));
    let mut ctrl = PlayController::new(
        Clock::fixed(fixed_now()),
        api,
        Arc::new(InMemoryDeadlineStore::new()),
    );

    ctrl.start(&settings()).await.unwrap();
    assert_eq!(ctrl.view().question.unwrap().number(), 1);
    assert_eq!(ctrl.view().remaining_seconds, Some(30));

    ctrl.select("a").unwrap();
    let first = ctrl.submit().await.unwrap();
    match first {
        SubmitOutcome::Committed(result) => assert!(result.is_correct),
        SubmitOutcome::Rejected => panic!("first submit must commit"),
    }
    assert_eq!(ctrl.view().streak, 1);

    ctrl.advance().await.unwrap();
    assert_eq!(ctrl.view().question.unwrap().number(), 2);

    ctrl.select("b").unwrap();
    let second = ctrl.submit().await.unwrap();
    match second {
        SubmitOutcome::Committed(result) => {
            assert!(!result.is_correct);
            assert!(result.quiz_completed);
        }
        SubmitOutcome::Rejected => panic!("second submit must commit"),
    }
    // wrong answer resets the streak
    assert_eq!(ctrl.view().streak, 0);

    ctrl.advance().await.unwrap();
    assert!(ctrl.is_finished());
    let view = ctrl.view();
    let stats = view.final_stats.unwrap();
    assert_eq!(stats.questions_answered, 2);
    assert!(view.question.is_none());
    assert!(view.notification.is_none());
}

#[tokio::test]
async fn remaining_time_never_resets_upward_within_a_question() {
    let api = Arc::new(FixedQuizApi::new(vec![question(1, 1, 1)]));
    let deadlines = Arc::new(InMemoryDeadlineStore::new());
    let now = fixed_now();

    let mut ctrl = PlayController::new(Clock::fixed(now), api.clone(), deadlines.clone());
    ctrl.start(&settings()).await.unwrap();

    let mut last = ctrl.view().remaining_seconds.unwrap();
    for elapsed in [3_i64, 9, 16, 24, 29] {
        // fresh controller each step simulates reload/navigation
        let mut resumed = PlayController::new(
            Clock::fixed(now + Duration::seconds(elapsed)),
            api.clone(),
            deadlines.clone(),
        );
        resumed.start(&settings()).await.unwrap();
        let remaining = resumed.view().remaining_seconds.unwrap();
        assert!(remaining <= last, "remaining time must not reset upward");
        last = remaining;
    }
}
