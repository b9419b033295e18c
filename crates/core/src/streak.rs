use std::collections::BTreeSet;

//
// ─── STREAK TRACKER ────────────────────────────────────────────────────────────
//

/// Consecutive-correct counter with one-shot milestone firing.
///
/// Milestones are scoped to a session: once a threshold fires it never fires
/// again, even if the streak drops and climbs back past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakTracker {
    current: u32,
    thresholds: Vec<u32>,
    fired: BTreeSet<u32>,
}

impl StreakTracker {
    /// Build a tracker with explicit milestone thresholds.
    ///
    /// Thresholds are deduplicated and kept in ascending order.
    #[must_use]
    pub fn with_thresholds(thresholds: &[u32]) -> Self {
        let ordered: BTreeSet<u32> = thresholds.iter().copied().filter(|t| *t > 0).collect();
        Self {
            current: 0,
            thresholds: ordered.into_iter().collect(),
            fired: BTreeSet::new(),
        }
    }

    /// Default thresholds as a step function of the session length.
    ///
    /// Short sessions celebrate early; long sessions space milestones out so
    /// they stay meaningful.
    #[must_use]
    pub fn for_question_count(questions_count: u32) -> Self {
        let thresholds: &[u32] = match questions_count {
            0..=5 => &[3, 5],
            6..=10 => &[4, 7, 10],
            11..=15 => &[5, 10, 15],
            _ => &[7, 14, 20],
        };
        Self::with_thresholds(thresholds)
    }

    /// Current consecutive-correct count.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }

    /// Record a result and return the thresholds newly reached.
    ///
    /// Correct increments the streak; incorrect resets it to zero. Each
    /// returned threshold is guaranteed to be reported only once per session.
    pub fn on_result(&mut self, is_correct: bool) -> Vec<u32> {
        if !is_correct {
            self.current = 0;
            return Vec::new();
        }

        self.current += 1;
        let mut newly_fired = Vec::new();
        for &threshold in &self.thresholds {
            if self.current >= threshold && self.fired.insert(threshold) {
                newly_fired.push(threshold);
            }
        }
        newly_fired
    }

    /// Overwrite the streak with the backend's authoritative count.
    ///
    /// Milestones still fire locally off the adjusted value.
    pub fn sync_to(&mut self, streak: u32) -> Vec<u32> {
        self.current = streak;
        let mut newly_fired = Vec::new();
        for &threshold in &self.thresholds {
            if self.current >= threshold && self.fired.insert(threshold) {
                newly_fired.push(threshold);
            }
        }
        newly_fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_fires_once_for_short_session() {
        // questions_count = 5 → thresholds [3, 5]
        let mut tracker = StreakTracker::for_question_count(5);

        assert!(tracker.on_result(true).is_empty());
        assert!(tracker.on_result(true).is_empty());
        assert_eq!(tracker.on_result(true), vec![3]);
        // fourth correct answer does not refire 3
        assert!(tracker.on_result(true).is_empty());
        assert_eq!(tracker.current(), 4);
    }

    #[test]
    fn incorrect_resets_streak() {
        let mut tracker = StreakTracker::for_question_count(10);
        tracker.on_result(true);
        tracker.on_result(true);
        assert!(tracker.on_result(false).is_empty());
        assert_eq!(tracker.current(), 0);
    }

    #[test]
    fn threshold_never_refires_after_reset() {
        let mut tracker = StreakTracker::with_thresholds(&[2]);
        tracker.on_result(true);
        assert_eq!(tracker.on_result(true), vec![2]);
        tracker.on_result(false);
        tracker.on_result(true);
        assert!(tracker.on_result(true).is_empty());
    }

    #[test]
    fn step_function_matches_session_length() {
        assert_eq!(StreakTracker::for_question_count(5).thresholds(), &[3, 5]);
        assert_eq!(
            StreakTracker::for_question_count(10).thresholds(),
            &[4, 7, 10]
        );
        assert_eq!(
            StreakTracker::for_question_count(15).thresholds(),
            &[5, 10, 15]
        );
        assert_eq!(
            StreakTracker::for_question_count(40).thresholds(),
            &[7, 14, 20]
        );
    }

    #[test]
    fn sync_to_fires_skipped_thresholds() {
        let mut tracker = StreakTracker::with_thresholds(&[3, 5]);
        assert_eq!(tracker.sync_to(5), vec![3, 5]);
        assert!(tracker.sync_to(6).is_empty());
    }
}
