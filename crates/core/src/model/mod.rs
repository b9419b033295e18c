mod ids;
mod phase;
mod question;
mod submission;

pub use ids::{ParseIdError, QuestionId, SessionId};
pub use phase::{GateRejected, QuestionPhase};
pub use question::{Question, QuestionError};
pub use submission::{DifficultyShift, SessionStats, SubmissionResult};
