#![forbid(unsafe_code)]

pub mod countdown;
pub mod feedback;
pub mod model;
pub mod streak;
pub mod time;

pub use countdown::{Countdown, CountdownTick};
pub use feedback::{ContextTag, Notification, NotificationKind, NotificationQueue};
pub use streak::StreakTracker;
pub use time::Clock;
