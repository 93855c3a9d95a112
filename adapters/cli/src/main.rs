#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Lily Hop session headlessly.
//!
//! The adapter owns a virtual clock that advances in fixed frame steps, feeds
//! one scripted intent to the engine per turn, and prints a text frame after
//! every processed turn.

use std::{io, time::Duration};

use anyhow::Result as AnyResult;
use clap::{Parser, ValueEnum};
use lily_hop_core::{Cue, CueSink, Direction, Event, SessionStatus, UniformSource};
use lily_hop_engine::Engine;
use lily_hop_rendering::{GridPresentation, RenderingBackend, Scene, TextBackend};
use lily_hop_system_audio::{tones, Tone};
use log::{debug, info};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "lily-hop")]
#[command(about = "Headless Lily Hop session driven by a move script", long_about = None)]
struct Args {
    /// Seed for the leaf field. Omit to seed from system entropy.
    #[arg(long)]
    seed: Option<u64>,

    /// Moves applied one per turn in the chosen layout, '.' waits a turn.
    #[arg(long, default_value = "")]
    moves: String,

    /// Key layout the move script is written in.
    #[arg(long, value_enum, default_value_t = Layout::Arrows)]
    layout: Layout,

    /// Length of one virtual frame in milliseconds.
    #[arg(long, default_value_t = 250)]
    frame_ms: u64,

    /// Stop after this many turns.
    #[arg(long, default_value_t = 20)]
    max_turns: u64,

    /// Continue automatically after each lost life instead of stopping.
    #[arg(long, default_value_t = false)]
    auto_continue: bool,

    /// Suppress audio cues.
    #[arg(long, default_value_t = false)]
    mute: bool,
}

/// Letters a move script uses for the four directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// `u` up, `d` down, `l` left, `r` right.
    Arrows,
    /// `w` up, `s` down, `a` left, `d` right.
    Wasd,
}

impl Layout {
    fn direction(self, symbol: char) -> Option<Direction> {
        let direction = match (self, symbol) {
            (Self::Arrows, 'u') | (Self::Wasd, 'w') => Direction::Up,
            (Self::Arrows, 'd') | (Self::Wasd, 's') => Direction::Down,
            (Self::Arrows, 'l') | (Self::Wasd, 'a') => Direction::Left,
            (Self::Arrows, 'r') | (Self::Wasd, 'd') => Direction::Right,
            _ => return None,
        };
        Some(direction)
    }

    fn symbols(self) -> &'static str {
        match self {
            Self::Arrows => "u d l r",
            Self::Wasd => "w a s d",
        }
    }
}

/// Single step of a move script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Intent {
    Hop(Direction),
    Wait,
}

#[derive(Debug, Error, PartialEq, Eq)]
enum ScriptError {
    #[error("unknown move '{symbol}' at position {offset}; expected one of {expected} .")]
    UnknownMove {
        symbol: char,
        offset: usize,
        expected: &'static str,
    },
}

fn parse_script(script: &str, layout: Layout) -> Result<Vec<Intent>, ScriptError> {
    script
        .chars()
        .enumerate()
        .filter(|(_, symbol)| !symbol.is_whitespace() && *symbol != ',')
        .map(|(offset, symbol)| {
            if symbol == '.' {
                return Ok(Intent::Wait);
            }
            layout
                .direction(symbol.to_ascii_lowercase())
                .map(Intent::Hop)
                .ok_or(ScriptError::UnknownMove {
                    symbol,
                    offset,
                    expected: layout.symbols(),
                })
        })
        .collect()
}

/// Cue sink that reports every cue through the log.
#[derive(Debug, Default)]
struct LoggingCueSink {
    played: usize,
}

impl CueSink for LoggingCueSink {
    fn play(&mut self, cue: Cue) {
        self.played += 1;
        info!("cue {cue:?}: {}", describe_tones(tones(cue)));
    }
}

fn describe_tones(tones: &[Tone]) -> String {
    tones
        .iter()
        .map(|tone| {
            format!(
                "{:.0}Hz {}ms @{}ms",
                tone.frequency_hz,
                tone.duration.as_millis(),
                tone.offset.as_millis()
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Entry point for the Lily Hop command-line interface.
fn main() -> AnyResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let script = parse_script(&args.moves, args.layout)?;
    let sink = LoggingCueSink::default();

    match args.seed {
        Some(seed) => {
            info!("seeding leaf field with {seed}");
            run(Engine::seeded(seed, sink), &args, script)
        }
        None => run(Engine::unseeded(sink), &args, script),
    }
}

fn run<R: UniformSource>(
    mut engine: Engine<R, LoggingCueSink>,
    args: &Args,
    script: Vec<Intent>,
) -> AnyResult<()> {
    let stdout = io::stdout();
    let mut backend = TextBackend::new(stdout.lock());
    let presentation = GridPresentation::new(engine.state().grid, 1.0)?;
    let frame = Duration::from_millis(args.frame_ms.max(1));

    engine.set_muted(args.mute);
    engine.start_game();
    backend.present(&Scene::from_snapshot(&engine.state(), presentation))?;

    let mut now = Duration::ZERO;
    engine.update(now);
    let mut intents = script.into_iter();

    for _ in 0..args.max_turns {
        if let Some(Intent::Hop(direction)) = intents.next() {
            let moved = engine.move_bird(direction);
            debug!("hop {direction:?} moved={moved}");
        }
        if !settle(&mut engine, args.auto_continue) {
            break;
        }

        loop {
            now += frame;
            engine.update(now);
            let advanced = engine
                .recent_events()
                .iter()
                .any(|event| matches!(event, Event::TurnAdvanced { .. }));
            if advanced || engine.status() != SessionStatus::Playing {
                break;
            }
        }

        backend.present(&Scene::from_snapshot(&engine.state(), presentation))?;
        if !settle(&mut engine, args.auto_continue) {
            break;
        }
    }

    let state = engine.state();
    info!(
        "session ended after {} turns: score {}, lives {}, {} cues",
        state.turn,
        state.score,
        state.lives,
        engine.cue_sink().played
    );
    Ok(())
}

/// Resolves paused states and reports whether play can go on.
fn settle<R: UniformSource, S: CueSink>(engine: &mut Engine<R, S>, auto_continue: bool) -> bool {
    match engine.status() {
        SessionStatus::Playing => true,
        SessionStatus::LifeLost if auto_continue => {
            engine.continue_after_life_loss();
            engine.status() == SessionStatus::Playing
        }
        SessionStatus::LifeLost | SessionStatus::GameOver | SessionStatus::StartScreen => false,
    }
}
