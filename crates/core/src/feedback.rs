use chrono::{DateTime, Duration, Utc};

//
// ─── NOTIFICATION ──────────────────────────────────────────────────────────────
//

/// Context tag binding a notification to the question it was issued for.
///
/// The controller stamps each active question with a fresh generation;
/// feedback from an older generation is stale and gets discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextTag(pub u64);

/// Category of transient feedback shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// The question's time budget ran out.
    Timeout,
    /// A streak milestone was reached.
    Milestone,
    /// The adaptive backend moved the difficulty up or down.
    DifficultyShift,
    /// Anything informational.
    Info,
}

impl NotificationKind {
    /// Priority tier; higher shows first.
    #[must_use]
    pub fn priority(&self) -> u8 {
        match self {
            Self::Timeout => 3,
            Self::Milestone => 2,
            Self::DifficultyShift => 1,
            Self::Info => 0,
        }
    }

    /// How long the notification stays on screen.
    #[must_use]
    pub fn display_duration(&self) -> Duration {
        match self {
            Self::Timeout => Duration::milliseconds(2_500),
            Self::Milestone => Duration::milliseconds(3_500),
            Self::DifficultyShift | Self::Info => Duration::milliseconds(3_000),
        }
    }
}

/// A short-lived feedback event scoped to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub priority: u8,
    pub context: ContextTag,
    pub created_at: DateTime<Utc>,
    pub duration: Duration,
}

impl Notification {
    /// Build a notification with the kind's default priority and duration.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        kind: NotificationKind,
        context: ContextTag,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            message: message.into(),
            kind,
            priority: kind.priority(),
            context,
            created_at,
            duration: kind.display_duration(),
        }
    }
}

//
// ─── QUEUE ─────────────────────────────────────────────────────────────────────
//

struct Displayed {
    notification: Notification,
    until: DateTime<Utc>,
}

/// Priority queue of feedback events, showing at most one at a time.
///
/// Ordering is `(priority desc, created_at asc)` via stable sorted insertion,
/// so a burst of timeout + milestone + difficulty events arriving within one
/// tick still presents deterministically and without overlap.
#[derive(Default)]
pub struct NotificationQueue {
    queued: Vec<Notification>,
    displayed: Option<Displayed>,
}

impl NotificationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The notification currently on screen, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Notification> {
        self.displayed.as_ref().map(|d| &d.notification)
    }

    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Add an event, invalidating feedback from other contexts.
    ///
    /// Queued entries whose context differs from the new entry's are dropped
    /// (a new question makes the previous question's feedback meaningless).
    /// A displayed entry sharing the new entry's context is retired early
    /// only when the newcomer has strictly higher priority.
    pub fn enqueue(&mut self, notification: Notification, now: DateTime<Utc>) {
        self.queued.retain(|n| n.context == notification.context);

        if let Some(displayed) = &self.displayed {
            let stale_context = displayed.notification.context != notification.context;
            let preempted = !stale_context
                && notification.priority > displayed.notification.priority;
            if stale_context || preempted {
                self.displayed = None;
            }
        }

        // stable insertion keeps created_at order within a priority tier
        let at = self
            .queued
            .partition_point(|n| n.priority >= notification.priority);
        self.queued.insert(at, notification);

        self.advance(now);
    }

    /// Drive the display loop: retire an expired entry, promote the head.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        if let Some(displayed) = &self.displayed {
            if now >= displayed.until {
                self.displayed = None;
            }
        }

        if self.displayed.is_none() && !self.queued.is_empty() {
            let notification = self.queued.remove(0);
            let until = now + notification.duration;
            self.displayed = Some(Displayed {
                notification,
                until,
            });
        }
    }

    /// Drop everything not belonging to the given context.
    ///
    /// Called when a new question becomes active so a straggling event from
    /// the previous question can never reach the screen.
    pub fn retire_stale(&mut self, context: ContextTag) {
        self.queued.retain(|n| n.context == context);
        if let Some(displayed) = &self.displayed {
            if displayed.notification.context != context {
                self.displayed = None;
            }
        }
    }

    /// Discard all state (session ended).
    pub fn clear(&mut self) {
        self.queued.clear();
        self.displayed = None;
    }
}
