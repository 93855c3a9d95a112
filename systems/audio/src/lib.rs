#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that translates world events into audio cues.
//!
//! The system never plays anything itself. It reacts to event batches with
//! [`Cue`] values that the engine forwards to whatever sink the host injected,
//! and it publishes the beep pattern each cue is meant to sound like so
//! adapters with a synthesizer can render them consistently.

use std::time::Duration;

use lily_hop_core::{Cue, Event, Landing};

/// Single sine beep that composes part of a cue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    /// Pitch of the beep in hertz.
    pub frequency_hz: f32,
    /// Time the beep takes to fade out.
    pub duration: Duration,
    /// Peak gain in the range 0.0..=1.0.
    pub volume: f32,
    /// Delay from the start of the cue until the beep begins.
    pub offset: Duration,
}

impl Tone {
    const fn new(frequency_hz: f32, duration_ms: u64, volume: f32, offset_ms: u64) -> Self {
        Self {
            frequency_hz,
            duration: Duration::from_millis(duration_ms),
            volume,
            offset: Duration::from_millis(offset_ms),
        }
    }
}

const HOP_TONES: [Tone; 1] = [Tone::new(600.0, 100, 0.2, 0)];
const FOOD_TONES: [Tone; 2] = [
    Tone::new(800.0, 50, 0.3, 0),
    Tone::new(1_000.0, 50, 0.3, 50),
];
const SINKING_TONES: [Tone; 1] = [Tone::new(350.0, 100, 0.15, 0)];
const LIFE_LOST_TONES: [Tone; 2] = [
    Tone::new(400.0, 100, 0.4, 0),
    Tone::new(300.0, 150, 0.4, 100),
];
const GAME_OVER_TONES: [Tone; 3] = [
    Tone::new(500.0, 150, 0.4, 0),
    Tone::new(400.0, 150, 0.4, 150),
    Tone::new(300.0, 300, 0.4, 300),
];

/// Returns the beep pattern that renders the provided cue.
#[must_use]
pub fn tones(cue: Cue) -> &'static [Tone] {
    match cue {
        Cue::Hop => &HOP_TONES,
        Cue::FoodCollected => &FOOD_TONES,
        Cue::LeafSinking => &SINKING_TONES,
        Cue::LifeLost => &LIFE_LOST_TONES,
        Cue::GameOver => &GAME_OVER_TONES,
    }
}

/// Maps world events onto the cues that accompany them.
#[derive(Clone, Copy, Debug, Default)]
pub struct AudioCues {
    muted: bool,
}

impl AudioCues {
    /// Creates an unmuted audio system.
    #[must_use]
    pub const fn new() -> Self {
        Self { muted: false }
    }

    /// Suppresses or restores every cue.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Whether cues are currently suppressed.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Consumes an event batch and emits one cue per audible event, in order.
    pub fn handle(&self, events: &[Event], out: &mut Vec<Cue>) {
        if self.muted {
            return;
        }

        out.extend(events.iter().filter_map(cue_for));
    }
}

fn cue_for(event: &Event) -> Option<Cue> {
    match event {
        Event::BirdLanded {
            landing: Landing::Leaf,
            ..
        } => Some(Cue::Hop),
        Event::BirdLanded {
            landing: Landing::Food,
            ..
        } => Some(Cue::FoodCollected),
        Event::LeafSinking { .. } => Some(Cue::LeafSinking),
        Event::LifeLost { .. } => Some(Cue::LifeLost),
        Event::GameOver { .. } => Some(Cue::GameOver),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_cue_has_a_tone_pattern() {
        for cue in [
            Cue::Hop,
            Cue::FoodCollected,
            Cue::LeafSinking,
            Cue::LifeLost,
            Cue::GameOver,
        ] {
            let pattern = tones(cue);
            assert!(!pattern.is_empty());
            assert!(pattern.windows(2).all(|pair| pair[0].offset <= pair[1].offset));
            assert!(pattern.iter().all(|tone| (0.0..=1.0).contains(&tone.volume)));
        }
    }

    #[test]
    fn life_loss_and_game_over_sound_different() {
        assert_ne!(tones(Cue::LifeLost), tones(Cue::GameOver));
    }
}
