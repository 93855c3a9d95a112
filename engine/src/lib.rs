#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Owned Lily Hop simulation object exposed to presentation code.
//!
//! [`Engine`] wires the authoritative world to the turn scheduler and the
//! audio system. Hosts push timestamps through [`Engine::update`] and
//! directional intents through [`Engine::move_bird`]; both run a full
//! mutation before returning. State leaves the engine only as owned
//! [`GameSnapshot`] copies.

mod source;

use std::time::Duration;

use lily_hop_core::{
    Command, Cue, CueSink, Direction, Event, GameSnapshot, SessionStatus, UniformSource,
};
use lily_hop_system_audio::AudioCues;
use lily_hop_system_turn_scheduler::TurnScheduler;
use lily_hop_world::{self as world, query, Config, World};
use log::trace;
use rand::{rngs::StdRng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use crate::source::RngSource;

/// Engine backed by a reproducible ChaCha generator.
pub type SeededEngine<S> = Engine<RngSource<ChaCha8Rng>, S>;

/// Engine backed by an entropy-seeded generator.
pub type UnseededEngine<S> = Engine<RngSource<StdRng>, S>;

/// Single-session simulation that owns its world, randomness, and cue sink.
#[derive(Debug)]
pub struct Engine<R, S> {
    world: World,
    source: R,
    sink: S,
    scheduler: TurnScheduler,
    audio: AudioCues,
    last_update: Option<Duration>,
    recent_events: Vec<Event>,
}

impl<R: UniformSource, S: CueSink> Engine<R, S> {
    /// Creates an engine on the start screen using the default configuration.
    #[must_use]
    pub fn new(source: R, sink: S) -> Self {
        Self::with_config(Config::default(), source, sink)
    }

    /// Creates an engine on the start screen using the provided configuration.
    #[must_use]
    pub fn with_config(config: Config, mut source: R, sink: S) -> Self {
        let world = World::new(config, &mut source);
        Self::from_world(world, source, sink)
    }

    /// Wraps an already constructed world.
    #[must_use]
    pub fn from_world(world: World, source: R, sink: S) -> Self {
        Self {
            world,
            source,
            sink,
            scheduler: TurnScheduler::default(),
            audio: AudioCues::new(),
            last_update: None,
            recent_events: Vec::new(),
        }
    }

    /// Captures an owned copy of the complete game state.
    #[must_use]
    pub fn state(&self) -> GameSnapshot {
        query::snapshot(&self.world)
    }

    /// Current lifecycle state of the session.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        query::status(&self.world)
    }

    /// Leaves the start screen. Ignored in every other state.
    pub fn start_game(&mut self) {
        self.begin_call();
        self.dispatch(Command::StartGame);
    }

    /// Replaces a finished session with a fresh one. Ignored unless the game is over.
    pub fn restart(&mut self) {
        self.begin_call();
        self.dispatch(Command::Restart);
    }

    /// Respawns the bird after a lost life. Ignored unless a life was just lost.
    pub fn continue_after_life_loss(&mut self) {
        self.begin_call();
        self.dispatch(Command::ContinueAfterLifeLoss);
    }

    /// Hops the bird one cell and reports whether its position changed.
    pub fn move_bird(&mut self, direction: Direction) -> bool {
        self.begin_call();
        self.dispatch(Command::MoveBird { direction });
        self.recent_events
            .iter()
            .any(|event| matches!(event, Event::BirdMoved { .. }))
    }

    /// Feeds a timestamp from the host clock and processes a turn when one is due.
    pub fn update(&mut self, now: Duration) {
        self.begin_call();
        self.last_update = Some(now);

        let mut commands = Vec::new();
        self.scheduler.poll(now, self.status(), &mut commands);
        for command in commands {
            self.dispatch(command);
        }
    }

    /// Suppresses or restores audio cues.
    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    /// Whether audio cues are currently suppressed.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.audio.is_muted()
    }

    /// Timestamp most recently passed to [`Engine::update`].
    #[must_use]
    pub fn last_update(&self) -> Option<Duration> {
        self.last_update
    }

    /// Events produced by the most recent call into the engine.
    #[must_use]
    pub fn recent_events(&self) -> &[Event] {
        &self.recent_events
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the injected cue sink.
    #[must_use]
    pub fn cue_sink(&self) -> &S {
        &self.sink
    }

    fn begin_call(&mut self) {
        self.recent_events.clear();
    }

    fn dispatch(&mut self, command: Command) {
        trace!("dispatching {command:?}");
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut self.source, &mut events);
        self.scheduler.observe(&events);

        let mut cues: Vec<Cue> = Vec::new();
        self.audio.handle(&events, &mut cues);
        for cue in cues {
            self.sink.play(cue);
        }

        self.recent_events.extend(events);
    }
}

impl<S: CueSink> Engine<RngSource<ChaCha8Rng>, S> {
    /// Creates an engine whose randomness is fully determined by `seed`.
    #[must_use]
    pub fn seeded(seed: u64, sink: S) -> Self {
        Self::new(RngSource::new(ChaCha8Rng::seed_from_u64(seed)), sink)
    }
}

impl<S: CueSink> Engine<RngSource<StdRng>, S> {
    /// Creates an engine seeded from operating system entropy.
    #[must_use]
    pub fn unseeded(sink: S) -> Self {
        Self::new(RngSource::new(StdRng::from_entropy()), sink)
    }
}
