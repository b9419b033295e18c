#![forbid(unsafe_code)]

pub mod api;
pub mod error;
pub mod loader;
pub mod play;

pub use quiz_core::Clock;

pub use api::{HttpQuizApi, QuizApi, QuizSettings};
pub use error::{ApiError, LoadError, PlayError, SubmitError};
pub use loader::{LoadOutcome, LoaderConfig, QuestionLoader};
pub use play::{PlayController, PlayView, SubmitOutcome, TickOutcome, TICK_INTERVAL};
