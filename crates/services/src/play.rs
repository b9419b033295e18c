use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use quiz_core::feedback::{ContextTag, Notification, NotificationKind, NotificationQueue};
use quiz_core::model::{
    Question, QuestionPhase, SessionId, SessionStats, SubmissionResult,
};
use quiz_core::{Clock, Countdown, CountdownTick, StreakTracker};
use storage::repository::DeadlineStore;

use crate::api::{QuizApi, QuizSettings};
use crate::error::{PlayError, SubmitError};
use crate::loader::{LoadOutcome, LoaderConfig, QuestionLoader};

/// Recommended cadence for driving [`PlayController::tick`].
///
/// The controller recomputes remaining time from the clock on every tick, so
/// a slower or irregular cadence only coarsens the display, never the
/// deadline.
pub const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_millis(250);

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What a tick observed.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No active question (session idle or finished).
    Idle,
    /// The question is still running; carries whole seconds left.
    Running(u32),
    /// The deadline was crossed on this tick and an auto-submit ran.
    Expired(SubmitOutcome),
}

/// Result of a submission attempt after the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// This trigger won the gate and the backend accepted the answer.
    Committed(SubmissionResult),
    /// Another trigger already claimed the submission; this one is a no-op.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubmitTrigger {
    Manual,
    Timeout,
}

//
// ─── VIEW ──────────────────────────────────────────────────────────────────────
//

/// Read-only projection of the session for the presentation layer.
///
/// Rendering is out of scope here; the UI formats these fields as it likes.
#[derive(Debug)]
pub struct PlayView<'a> {
    pub remaining_seconds: Option<u32>,
    pub question: Option<&'a Question>,
    pub phase: QuestionPhase,
    pub selected: Option<&'a str>,
    pub notification: Option<&'a Notification>,
    pub streak: u32,
    pub last_result: Option<&'a SubmissionResult>,
    pub final_stats: Option<&'a SessionStats>,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

struct ActiveQuestion {
    question: Question,
    countdown: Countdown,
    phase: QuestionPhase,
    selected: Option<String>,
    context: ContextTag,
}

/// State machine for one quiz-play session.
///
/// Single-threaded and event-driven: the host calls `tick` on an interval and
/// `select`/`submit`/`advance` on user input; timer and network completions
/// interleave cooperatively through these methods. The per-question phase
/// gate guarantees that of the two submission triggers (timer expiry, manual
/// click) only the first commits; the deadline store keeps a question's
/// clock consistent across process restarts.
pub struct PlayController {
    clock: Clock,
    api: Arc<dyn QuizApi>,
    deadlines: Arc<dyn DeadlineStore>,
    loader: QuestionLoader,
    notifications: NotificationQueue,
    streak: Option<StreakTracker>,
    session_id: Option<SessionId>,
    active: Option<ActiveQuestion>,
    generation: u64,
    last_result: Option<SubmissionResult>,
    final_stats: Option<SessionStats>,
}

impl PlayController {
    #[must_use]
    pub fn new(clock: Clock, api: Arc<dyn QuizApi>, deadlines: Arc<dyn DeadlineStore>) -> Self {
        let loader = QuestionLoader::new(Arc::clone(&api));
        Self {
            clock,
            api,
            deadlines,
            loader,
            notifications: NotificationQueue::new(),
            streak: None,
            session_id: None,
            active: None,
            generation: 0,
            last_result: None,
            final_stats: None,
        }
    }

    #[must_use]
    pub fn with_loader_config(mut self, config: LoaderConfig) -> Self {
        self.loader = self.loader.with_config(config);
        self
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.final_stats.is_some()
    }

    /// Start a session and load its first question.
    ///
    /// # Errors
    ///
    /// Returns `PlayError` if the backend rejects the start request or the
    /// first question cannot be loaded.
    pub async fn start(&mut self, settings: &QuizSettings) -> Result<SessionId, PlayError> {
        let session_id = self.api.start_quiz(settings).await?;
        info!(%session_id, topic = %settings.topic, "quiz session started");

        self.session_id = Some(session_id.clone());
        self.streak = None;
        self.active = None;
        self.last_result = None;
        self.final_stats = None;
        self.notifications.clear();

        self.advance().await?;
        Ok(session_id)
    }

    /// Move to the next question, or end the session if it is over.
    ///
    /// Establishes or resumes the question's deadline, bumps the context
    /// generation, and retires feedback that belongs to older questions.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Load` when polling gives up or fails fatally and
    /// `PlayError::Storage` when the deadline cannot be persisted.
    pub async fn advance(&mut self) -> Result<(), PlayError> {
        let session_id = self
            .session_id
            .clone()
            .ok_or(PlayError::SessionNotStarted)?;

        // the last result already told us the quiz is over; skip the poll
        if let Some(result) = &self.last_result {
            if result.quiz_completed {
                self.finish(result.session_stats.clone());
                return Ok(());
            }
        }

        match self.loader.load(&session_id).await? {
            LoadOutcome::Completed => {
                let stats = self
                    .last_result
                    .as_ref()
                    .map(|r| r.session_stats.clone())
                    .unwrap_or_default();
                self.finish(stats);
                Ok(())
            }
            LoadOutcome::Ready(question) => {
                let now = self.clock.now();
                let expiry = self
                    .deadlines
                    .resume_or_create(&session_id, question.id(), question.time_budget_secs(), now)
                    .await
                    .map_err(PlayError::Storage)?;

                self.generation += 1;
                let context = ContextTag(self.generation);
                self.notifications.retire_stale(context);

                if self.streak.is_none() {
                    self.streak = Some(StreakTracker::for_question_count(
                        question.questions_count(),
                    ));
                }

                info!(
                    question = question.number(),
                    of = question.questions_count(),
                    difficulty = question.difficulty(),
                    "question active"
                );

                self.last_result = None;
                self.active = Some(ActiveQuestion {
                    countdown: Countdown::new(expiry),
                    phase: QuestionPhase::Idle,
                    selected: None,
                    context,
                    question,
                });
                Ok(())
            }
        }
    }

    /// Record the user's answer selection for the active question.
    ///
    /// Re-selection is allowed until a submission claims the gate.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Rejected` once submitting or answered, and
    /// `PlayError::NoActiveQuestion` outside a question.
    pub fn select(&mut self, answer: impl Into<String>) -> Result<(), PlayError> {
        let active = self.active.as_mut().ok_or(PlayError::NoActiveQuestion)?;
        active.phase.select()?;
        active.selected = Some(answer.into());
        Ok(())
    }

    /// Advance the countdown and the notification display loop.
    ///
    /// On the single expiry edge this auto-submits with whatever answer is
    /// selected (empty if none) and enqueues a timeout notification. Safe to
    /// call at any cadence; see [`TICK_INTERVAL`].
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Submit` if the expiry-triggered submission fails;
    /// local state is rolled back and a manual retry remains possible.
    pub async fn tick(&mut self) -> Result<TickOutcome, PlayError> {
        let now = self.clock.now();
        self.notifications.advance(now);

        let Some(active) = self.active.as_mut() else {
            return Ok(TickOutcome::Idle);
        };

        match active.countdown.poll(now) {
            CountdownTick::Running(secs) => Ok(TickOutcome::Running(secs)),
            CountdownTick::Lapsed => Ok(TickOutcome::Running(0)),
            CountdownTick::Expired => {
                let context = active.context;
                self.notifications.enqueue(
                    Notification::new("Time's up!", NotificationKind::Timeout, context, now),
                    now,
                );
                debug!("question deadline expired, auto-submitting");
                let outcome = self.commit(SubmitTrigger::Timeout).await?;
                Ok(TickOutcome::Expired(outcome))
            }
        }
    }

    /// Submit the selected answer (manual trigger).
    ///
    /// # Errors
    ///
    /// Returns `PlayError::NoSelection` if nothing is selected and
    /// `PlayError::Submit` if the backend rejects the answer; in the latter
    /// case the selection is preserved and retry is safe.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, PlayError> {
        let active = self.active.as_ref().ok_or(PlayError::NoActiveQuestion)?;
        if active.selected.is_none() {
            return Err(PlayError::NoSelection);
        }
        Ok(self.commit(SubmitTrigger::Manual).await?)
    }

    /// Abandon the session, discarding all per-session state.
    ///
    /// The deadline record is left in place; it expires naturally and a
    /// resumed session would pick it up.
    pub fn abandon(&mut self) {
        self.session_id = None;
        self.active = None;
        self.streak = None;
        self.last_result = None;
        self.final_stats = None;
        self.notifications.clear();
    }

    /// Read-only projection for the presentation layer.
    #[must_use]
    pub fn view(&self) -> PlayView<'_> {
        let now = self.clock.now();
        PlayView {
            remaining_seconds: self
                .active
                .as_ref()
                .map(|a| a.countdown.remaining_seconds(now)),
            question: self.active.as_ref().map(|a| &a.question),
            phase: self
                .active
                .as_ref()
                .map_or(QuestionPhase::Idle, |a| a.phase),
            selected: self.active.as_ref().and_then(|a| a.selected.as_deref()),
            notification: self.notifications.current(),
            streak: self.streak.as_ref().map_or(0, StreakTracker::current),
            last_result: self.last_result.as_ref(),
            final_stats: self.final_stats.as_ref(),
        }
    }

    fn finish(&mut self, stats: SessionStats) {
        info!(
            answered = stats.questions_answered,
            correct = stats.correct_count,
            "quiz session finished"
        );
        self.active = None;
        self.final_stats = Some(stats);
        self.notifications.clear();
    }

    /// The single commit path behind the submission gate.
    ///
    /// Whichever trigger reaches the gate first wins; the other observes
    /// `Rejected`. An expiry firing while a submission is in flight is also
    /// absorbed here, because the gate is already claimed.
    async fn commit(&mut self, trigger: SubmitTrigger) -> Result<SubmitOutcome, SubmitError> {
        let session_id = self
            .session_id
            .clone()
            .ok_or(SubmitError::NoActiveQuestion)?;
        let now = self.clock.now();

        let (question_id, answer, response_time, context) = {
            let active = self.active.as_mut().ok_or(SubmitError::NoActiveQuestion)?;
            if active.phase.begin_submission().is_err() {
                debug!(?trigger, "submission gate already claimed");
                return Ok(SubmitOutcome::Rejected);
            }

            let budget = active.question.time_budget_secs();
            let started = active.countdown.expiry() - Duration::seconds(i64::from(budget));
            // clamp so a late-arriving click cannot report more than the budget
            let response_time = u32::try_from(
                (now - started).num_seconds().clamp(0, i64::from(budget)),
            )
            .unwrap_or(budget);

            (
                active.question.id(),
                active.selected.clone().unwrap_or_default(),
                response_time,
                active.context,
            )
        };

        let submitted = self
            .api
            .submit_answer(question_id, &answer, response_time)
            .await;

        let result = match submitted {
            Ok(result) => result,
            Err(err) => {
                warn!(?trigger, error = %err, "answer submission failed, rolling back");
                if let Some(active) = self.active.as_mut() {
                    if active.context == context {
                        let had_selection = active.selected.is_some();
                        let _ = active.phase.rollback_submission(had_selection);
                    }
                }
                return Err(SubmitError::Api(err));
            }
        };

        // stale guard: only apply effects to the question this submit was
        // issued for
        let Some(active) = self.active.as_mut() else {
            return Ok(SubmitOutcome::Rejected);
        };
        if active.context != context {
            return Ok(SubmitOutcome::Rejected);
        }

        let _ = active.phase.complete_submission();
        active.countdown.disarm();

        if let Err(err) = self.deadlines.clear(&session_id, question_id).await {
            // the answer is committed server-side; a leftover record expires
            // on its own
            warn!(error = %err, "failed to clear deadline record");
        }

        let display_now = self.clock.now();
        if let Some(streak) = self.streak.as_mut() {
            for milestone in streak.sync_to(result.current_streak) {
                self.notifications.enqueue(
                    Notification::new(
                        format!("{milestone} correct in a row!"),
                        NotificationKind::Milestone,
                        context,
                        display_now,
                    ),
                    display_now,
                );
            }
        }

        if let Some(shift) = &result.difficulty_shift {
            self.notifications.enqueue(
                Notification::new(
                    format!("Difficulty changed from {} to {}", shift.previous, shift.new),
                    NotificationKind::DifficultyShift,
                    context,
                    display_now,
                ),
                display_now,
            );
        }

        info!(
            ?trigger,
            correct = result.is_correct,
            streak = result.current_streak,
            response_time,
            "answer committed"
        );

        self.last_result = Some(result.clone());
        if result.quiz_completed {
            // stats are final; the caller still sees the Result phase until
            // it advances
            self.final_stats = Some(result.session_stats.clone());
        }

        Ok(SubmitOutcome::Committed(result))
    }
}
