use serde::{Deserialize, Serialize};

/// Difficulty movement reported by the adaptive backend after an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyShift {
    pub previous: String,
    pub new: String,
}

/// Aggregate statistics for a session, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionStats {
    pub questions_answered: u32,
    pub correct_count: u32,
    pub accuracy_percent: f64,
    pub best_streak: u32,
}

/// Outcome of committing one answer.
///
/// Produced once per question; the controller keeps the latest result for
/// the presentation layer and feeds it into the streak tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    pub current_streak: u32,
    pub difficulty_shift: Option<DifficultyShift>,
    pub quiz_completed: bool,
    pub session_stats: SessionStats,
}
