use thiserror::Error;

/// Rejected transition on the per-question submission gate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("submission gate rejected the transition: already {phase:?}")]
pub struct GateRejected {
    pub phase: QuestionPhase,
}

/// Lifecycle of a single question, doubling as the submission gate.
///
/// Exactly one path may enter `Submitting`, whichever of the timer expiry or
/// the manual click arrives first; the loser observes `GateRejected` and
/// must treat it as a no-op. `Result` is terminal for the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionPhase {
    #[default]
    Idle,
    Answered,
    Submitting,
    Result,
}

impl QuestionPhase {
    /// Record that the user picked (or changed) an answer option.
    ///
    /// # Errors
    ///
    /// Returns `GateRejected` once a submission is in flight or committed.
    pub fn select(&mut self) -> Result<(), GateRejected> {
        match self {
            Self::Idle | Self::Answered => {
                *self = Self::Answered;
                Ok(())
            }
            Self::Submitting | Self::Result => Err(GateRejected { phase: *self }),
        }
    }

    /// Open the gate: claim the single submission slot for this question.
    ///
    /// # Errors
    ///
    /// Returns `GateRejected` if a submission is already in flight or done.
    pub fn begin_submission(&mut self) -> Result<(), GateRejected> {
        match self {
            Self::Idle | Self::Answered => {
                *self = Self::Submitting;
                Ok(())
            }
            Self::Submitting | Self::Result => Err(GateRejected { phase: *self }),
        }
    }

    /// Commit: the backend accepted the answer.
    ///
    /// # Errors
    ///
    /// Returns `GateRejected` unless a submission was in flight.
    pub fn complete_submission(&mut self) -> Result<(), GateRejected> {
        match self {
            Self::Submitting => {
                *self = Self::Result;
                Ok(())
            }
            other => Err(GateRejected { phase: *other }),
        }
    }

    /// Roll back a failed submission so the user can retry.
    ///
    /// Restores `Answered` when a selection existed, otherwise `Idle`;
    /// nothing was committed, so the gate reopens.
    ///
    /// # Errors
    ///
    /// Returns `GateRejected` unless a submission was in flight.
    pub fn rollback_submission(&mut self, had_selection: bool) -> Result<(), GateRejected> {
        match self {
            Self::Submitting => {
                *self = if had_selection {
                    Self::Answered
                } else {
                    Self::Idle
                };
                Ok(())
            }
            other => Err(GateRejected { phase: *other }),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result)
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}
