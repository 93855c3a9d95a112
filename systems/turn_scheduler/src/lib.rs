#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns wall-clock samples into discrete turn commands.
//!
//! Timestamps arrive at whatever cadence the presentation loop runs at. The
//! scheduler is the only place that decides where turn boundaries fall: a turn
//! fires once at least one turn duration has elapsed since the previous one,
//! and the clock then restarts from the timestamp that fired it.

use std::time::Duration;

use lily_hop_core::{Command, Event, SessionStatus, TURN_DURATION};

/// Threshold-based turn scheduler.
#[derive(Clone, Debug)]
pub struct TurnScheduler {
    turn_duration: Duration,
    last_turn: Option<Duration>,
}

impl TurnScheduler {
    /// Creates a scheduler firing at most once per `turn_duration`.
    #[must_use]
    pub const fn new(turn_duration: Duration) -> Self {
        Self {
            turn_duration,
            last_turn: None,
        }
    }

    /// Duration that separates two consecutive turns.
    #[must_use]
    pub const fn turn_duration(&self) -> Duration {
        self.turn_duration
    }

    /// Timestamp of the most recent turn boundary, if the clock is armed.
    #[must_use]
    pub const fn last_turn(&self) -> Option<Duration> {
        self.last_turn
    }

    /// Consumes world events, disarming the clock whenever the world asks for it.
    pub fn observe(&mut self, events: &[Event]) {
        if events
            .iter()
            .any(|event| matches!(event, Event::TurnClockReset))
        {
            self.last_turn = None;
        }
    }

    /// Checks whether a turn is due at `now` and emits at most one command.
    ///
    /// Nothing happens unless the session is playing. A disarmed clock arms
    /// itself on the first playing sample, so the first turn after a reset
    /// lands a full duration later. Drift is absorbed: the clock restarts at
    /// `now` rather than at the ideal boundary.
    pub fn poll(&mut self, now: Duration, status: SessionStatus, out: &mut Vec<Command>) {
        if status != SessionStatus::Playing {
            return;
        }

        let Some(last_turn) = self.last_turn else {
            self.last_turn = Some(now);
            return;
        };

        if now.saturating_sub(last_turn) >= self.turn_duration {
            self.last_turn = Some(now);
            out.push(Command::AdvanceTurn);
        }
    }
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new(TURN_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(scheduler: &mut TurnScheduler, millis: u64) -> usize {
        let mut commands = Vec::new();
        scheduler.poll(
            Duration::from_millis(millis),
            SessionStatus::Playing,
            &mut commands,
        );
        commands.len()
    }

    #[test]
    fn first_sample_arms_without_firing() {
        let mut scheduler = TurnScheduler::default();
        assert_eq!(poll(&mut scheduler, 5_000), 0);
        assert_eq!(scheduler.last_turn(), Some(Duration::from_millis(5_000)));
    }

    #[test]
    fn fires_once_threshold_is_reached() {
        let mut scheduler = TurnScheduler::default();
        assert_eq!(poll(&mut scheduler, 0), 0);
        assert_eq!(poll(&mut scheduler, 999), 0);
        assert_eq!(poll(&mut scheduler, 1_000), 1);
    }

    #[test]
    fn drift_is_absorbed_not_corrected() {
        let mut scheduler = TurnScheduler::default();
        assert_eq!(poll(&mut scheduler, 0), 0);
        assert_eq!(poll(&mut scheduler, 1_400), 1);
        assert_eq!(poll(&mut scheduler, 2_000), 0);
        assert_eq!(poll(&mut scheduler, 2_399), 0);
        assert_eq!(poll(&mut scheduler, 2_400), 1);
    }

    #[test]
    fn long_gap_still_fires_a_single_turn() {
        let mut scheduler = TurnScheduler::default();
        assert_eq!(poll(&mut scheduler, 0), 0);
        assert_eq!(poll(&mut scheduler, 10_000), 1);
        assert_eq!(poll(&mut scheduler, 10_016), 0);
    }

    #[test]
    fn backwards_timestamps_never_fire() {
        let mut scheduler = TurnScheduler::default();
        assert_eq!(poll(&mut scheduler, 2_000), 0);
        assert_eq!(poll(&mut scheduler, 500), 0);
    }

    #[test]
    fn idle_outside_playing() {
        let mut scheduler = TurnScheduler::default();
        let mut commands = Vec::new();
        for status in [
            SessionStatus::StartScreen,
            SessionStatus::LifeLost,
            SessionStatus::GameOver,
        ] {
            scheduler.poll(Duration::from_secs(30), status, &mut commands);
        }
        assert!(commands.is_empty());
        assert_eq!(scheduler.last_turn(), None);
    }

    #[test]
    fn reset_event_disarms_the_clock() {
        let mut scheduler = TurnScheduler::default();
        assert_eq!(poll(&mut scheduler, 0), 0);
        scheduler.observe(&[Event::TurnAdvanced { turn: 1 }]);
        assert!(scheduler.last_turn().is_some());

        scheduler.observe(&[Event::TurnClockReset]);
        assert_eq!(scheduler.last_turn(), None);
        assert_eq!(poll(&mut scheduler, 1_500), 0);
        assert_eq!(poll(&mut scheduler, 2_499), 0);
        assert_eq!(poll(&mut scheduler, 2_500), 1);
    }
}
