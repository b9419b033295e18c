use chrono::{DateTime, Utc};

use crate::time::remaining_seconds;

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

/// Result of polling the countdown at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Time remains; carries whole seconds left (rounded up).
    Running(u32),
    /// The deadline was just crossed. Reported exactly once.
    Expired,
    /// The deadline passed and `Expired` was already reported.
    Lapsed,
}

/// Deadline tracker for one question.
///
/// Remaining time is always recomputed from the absolute expiry and the
/// caller's clock, never decremented, so a suspended tab or a slow tick
/// cannot drift the clock. The expiry edge fires exactly once no matter how
/// many polls observe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    expiry: DateTime<Utc>,
    fired: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(expiry: DateTime<Utc>) -> Self {
        Self {
            expiry,
            fired: false,
        }
    }

    /// Absolute instant at which the question's time budget runs out.
    #[must_use]
    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Whole seconds left at `now`, clamped at zero.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u32 {
        remaining_seconds(self.expiry, now)
    }

    /// True once the expiry edge has been reported.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Poll the countdown.
    ///
    /// Returns `Expired` on the first poll at or after the deadline and
    /// `Lapsed` on every later one, so overlapping ticks cannot trigger the
    /// expiry action twice.
    pub fn poll(&mut self, now: DateTime<Utc>) -> CountdownTick {
        let remaining = self.remaining_seconds(now);
        if remaining > 0 {
            return CountdownTick::Running(remaining);
        }
        if self.fired {
            return CountdownTick::Lapsed;
        }
        self.fired = true;
        CountdownTick::Expired
    }

    /// Stop the countdown from ever reporting expiry (answer committed).
    pub fn disarm(&mut self) {
        self.fired = true;
    }
}
