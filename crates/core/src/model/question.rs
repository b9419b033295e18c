use thiserror::Error;

use crate::model::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,

    #[error("question has no answer options")]
    NoOptions,

    #[error("question number {number} is outside 1..={count}")]
    NumberOutOfRange { number: u32, count: u32 },

    #[error("time budget must be positive")]
    ZeroTimeBudget,
}

/// A single quiz question as served by the backend.
///
/// Immutable once loaded; the controller replaces it wholesale when the
/// session advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    number: u32,
    questions_count: u32,
    time_budget_secs: u32,
    text: String,
    options: Vec<String>,
    difficulty: String,
    topic: String,
    subtopic: Option<String>,
}

impl Question {
    /// Build a question from backend data, validating its shape.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text or options are empty, the
    /// ordinal is outside the session range, or the time budget is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuestionId,
        number: u32,
        questions_count: u32,
        time_budget_secs: u32,
        text: impl Into<String>,
        options: Vec<String>,
        difficulty: impl Into<String>,
        topic: impl Into<String>,
        subtopic: Option<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if number == 0 || number > questions_count {
            return Err(QuestionError::NumberOutOfRange {
                number,
                count: questions_count,
            });
        }
        if time_budget_secs == 0 {
            return Err(QuestionError::ZeroTimeBudget);
        }

        Ok(Self {
            id,
            number,
            questions_count,
            time_budget_secs,
            text,
            options,
            difficulty: difficulty.into(),
            topic: topic.into(),
            subtopic,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// 1-based ordinal of this question within the session.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Total number of questions in the session.
    #[must_use]
    pub fn questions_count(&self) -> u32 {
        self.questions_count
    }

    /// Per-question time budget in seconds.
    #[must_use]
    pub fn time_budget_secs(&self) -> u32 {
        self.time_budget_secs
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Difficulty label as reported by the adaptive backend.
    #[must_use]
    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn subtopic(&self) -> Option<&str> {
        self.subtopic.as_deref()
    }

    /// True when this is the last question of the session.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.number == self.questions_count
    }
}
