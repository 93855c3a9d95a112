#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lily Hop engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The engine submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams and respond with new command
//! batches or audio [`Cue`]s. Presentation code only ever sees owned
//! [`GameSnapshot`] copies.

use std::{collections::VecDeque, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells along each side of the square leaf grid.
pub const GRID_SIDE: u32 = 8;

/// Highest height level a leaf can reach. Level zero means the leaf is sunk.
pub const MAX_LEAF_LEVEL: u8 = 3;

/// Lives granted at the start of every session.
pub const INITIAL_LIVES: u32 = 5;

/// Score awarded for landing on a leaf that carries food.
pub const FOOD_BONUS: u32 = 20;

/// Score awarded for every other successful hop.
pub const HOP_SCORE: u32 = 1;

/// Simulated time that must elapse between two consecutive turns.
pub const TURN_DURATION: Duration = Duration::from_millis(1_000);

/// Cumulative thresholds applied to every unoccupied leaf once per turn.
pub const STEADY_STATE_TABLE: ProbabilityTable =
    ProbabilityTable::cumulative(0.03, 0.09, 0.15, 0.17);

/// Cumulative thresholds used when the leaf field is first generated.
pub const INITIAL_FIELD_TABLE: ProbabilityTable =
    ProbabilityTable::cumulative(0.40, 0.65, 0.80, 0.92);

/// Sample returned by a [`ScriptedSource`] once its queued samples run out.
///
/// It lies beyond every food threshold used by the shipped tables, so leaves
/// stay unchanged during steady-state turns.
pub const DEFAULT_FALLBACK_SAMPLE: f64 = 0.999;

const LARGEST_SAMPLE: f64 = 1.0 - f64::EPSILON;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Leaves the start screen and begins active play.
    StartGame,
    /// Replaces the finished session with a freshly generated one.
    Restart,
    /// Acknowledges a lost life and respawns the bird.
    ContinueAfterLifeLoss,
    /// Requests that the bird hop one cell in the provided direction.
    MoveBird {
        /// Direction of the attempted hop.
        direction: Direction,
    },
    /// Processes exactly one simulation turn.
    AdvanceTurn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Announces that the session moved between two lifecycle states.
    StatusChanged {
        /// Status that was active before the transition.
        from: SessionStatus,
        /// Status that became active.
        to: SessionStatus,
    },
    /// Requests that turn timing restart from the next observed timestamp.
    TurnClockReset,
    /// Confirms that a simulation turn was processed.
    TurnAdvanced {
        /// One-based index of the processed turn within the session.
        turn: u64,
    },
    /// Confirms that the bird hopped between two cells.
    BirdMoved {
        /// Cell the bird occupied before hopping.
        from: Position,
        /// Cell the bird occupies after hopping.
        to: Position,
    },
    /// Reports that a hop request left the world untouched.
    MoveRejected {
        /// Direction provided in the rejected request.
        direction: Direction,
        /// Specific reason the hop was refused.
        reason: MoveRejection,
    },
    /// Describes what the bird found at the destination of a hop.
    BirdLanded {
        /// Cell the bird landed on.
        cell: Position,
        /// Outcome of the landing.
        landing: Landing,
        /// Score after the landing was resolved.
        score: u32,
    },
    /// Warns that the leaf carrying the bird is one level away from sinking.
    LeafSinking {
        /// Cell of the leaf that is about to sink.
        cell: Position,
    },
    /// Reports that the bird lost a life while lives remain.
    LifeLost {
        /// Lives left after the loss.
        lives_remaining: u32,
    },
    /// Reports that the final life was lost.
    GameOver {
        /// Score reached by the finished session.
        score: u32,
    },
    /// Confirms that the bird was placed on a new cell after a lost life.
    BirdRespawned {
        /// Cell the bird occupied when the life was lost.
        from: Position,
        /// Cell chosen for the respawn.
        to: Position,
    },
    /// Announces that a brand new leaf field replaced the previous one.
    FieldRegenerated,
}

/// Lifecycle states of a single game session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Waiting for the player to start the session.
    #[default]
    StartScreen,
    /// Turns and hops are processed.
    Playing,
    /// Paused after a lost life until the player continues.
    LifeLost,
    /// Terminal state that waits for a restart.
    GameOver,
}

/// Cardinal directions available to the bird.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Outcome of a hop that reached its destination cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landing {
    /// The destination carried an ordinary leaf.
    Leaf,
    /// The destination carried food that the bird collected.
    Food,
    /// The destination leaf was sunk and the bird lost its footing.
    Sunk,
}

/// Reasons a hop request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The session is not in the playing state.
    NotPlaying,
    /// The hop would leave the grid.
    Wall,
}

/// Audible feedback requested by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// The bird landed on an ordinary leaf.
    Hop,
    /// The bird collected food.
    FoodCollected,
    /// The occupied leaf is about to sink.
    LeafSinking,
    /// A life was lost and the session paused.
    LifeLost,
    /// The final life was lost.
    GameOver,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Square index space that maps positions onto a dense leaf array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SerializedGrid")]
pub struct Grid {
    side: u32,
}

/// Wire form of [`Grid`]; decoding goes through [`Grid::new`].
#[derive(Deserialize)]
struct SerializedGrid {
    side: u32,
}

impl From<SerializedGrid> for Grid {
    fn from(serialized: SerializedGrid) -> Self {
        Self::new(serialized.side)
    }
}

impl Grid {
    /// Creates a grid with the provided side length.
    ///
    /// A side of zero is promoted to one so the grid always holds a cell the
    /// bird can stand on.
    #[must_use]
    pub const fn new(side: u32) -> Self {
        let side = if side == 0 { 1 } else { side };
        Self { side }
    }

    /// Number of cells along each side of the grid.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.side as usize * self.side as usize
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x < self.side && position.y < self.side
    }

    /// Converts a position inside the grid into its row-major linear index.
    #[must_use]
    pub const fn position_to_index(&self, position: Position) -> usize {
        position.y as usize * self.side as usize + position.x as usize
    }

    /// Converts a row-major linear index back into a position.
    #[must_use]
    pub const fn index_to_position(&self, index: usize) -> Position {
        let side = self.side as usize;
        Position::new((index % side) as u32, (index / side) as u32)
    }

    /// Moves one cell in the provided direction, clamping to the grid edges.
    ///
    /// The returned position equals the input when the step would leave the
    /// grid.
    #[must_use]
    pub fn step(&self, position: Position, direction: Direction) -> Position {
        let last = self.side.saturating_sub(1);
        match direction {
            Direction::Up => Position::new(position.x, position.y.saturating_sub(1)),
            Direction::Down => Position::new(position.x, position.y.saturating_add(1).min(last)),
            Direction::Left => Position::new(position.x.saturating_sub(1), position.y),
            Direction::Right => Position::new(position.x.saturating_add(1).min(last), position.y),
        }
    }

    /// Iterates over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let grid = *self;
        (0..grid.cell_count()).map(move |index| grid.index_to_position(index))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GRID_SIDE)
    }
}

/// Height and food state of the leaf occupying one grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leaf {
    height: u8,
    has_food: bool,
}

impl Leaf {
    /// Creates a leaf with the provided height and food flag.
    ///
    /// Food is dropped when the height is zero because a sunk leaf cannot
    /// carry anything.
    #[must_use]
    pub const fn new(height: u8, has_food: bool) -> Self {
        Self {
            height,
            has_food: has_food && height > 0,
        }
    }

    /// Creates a fully sunk leaf.
    #[must_use]
    pub const fn sunk() -> Self {
        Self::new(0, false)
    }

    /// Current height level of the leaf.
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Whether the leaf carries food.
    #[must_use]
    pub const fn has_food(&self) -> bool {
        self.has_food
    }

    /// Whether the leaf is fully sunk and offers no footing.
    #[must_use]
    pub const fn is_sunk(&self) -> bool {
        self.height == 0
    }

    /// Whether the leaf sits at or above the provided maximum level.
    #[must_use]
    pub const fn is_full(&self, max_level: u8) -> bool {
        self.height >= max_level
    }
}

/// Bucket selected for a leaf by a [`ProbabilityTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeafOutcome {
    /// The leaf surfaces to the maximum height.
    RestoreFull,
    /// The leaf grows by a single level.
    Grow,
    /// The leaf sinks by a single level.
    Sink,
    /// Food appears on the leaf.
    SpawnFood,
    /// The leaf keeps its current state.
    Unchanged,
}

/// Cumulative probability thresholds driving leaf changes.
///
/// A uniform sample `s` selects [`LeafOutcome::RestoreFull`] when
/// `s < full`, [`LeafOutcome::Grow`] when `s < grow`, [`LeafOutcome::Sink`]
/// when `s < sink`, [`LeafOutcome::SpawnFood`] when `s < food`, and
/// [`LeafOutcome::Unchanged`] otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    full: f64,
    grow: f64,
    sink: f64,
    food: f64,
}

impl ProbabilityTable {
    /// Creates a table after validating that the thresholds ascend within `0.0..=1.0`.
    pub fn new(full: f64, grow: f64, sink: f64, food: f64) -> Result<Self, TableError> {
        let thresholds = [("full", full), ("grow", grow), ("sink", sink), ("food", food)];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(TableError::OutOfRange { name, value });
            }
        }

        for pair in thresholds.windows(2) {
            let (lower, lower_value) = pair[0];
            let (upper, upper_value) = pair[1];
            if upper_value < lower_value {
                return Err(TableError::Descending {
                    lower,
                    lower_value,
                    upper,
                    upper_value,
                });
            }
        }

        Ok(Self::cumulative(full, grow, sink, food))
    }

    const fn cumulative(full: f64, grow: f64, sink: f64, food: f64) -> Self {
        Self {
            full,
            grow,
            sink,
            food,
        }
    }

    /// Upper bound of the restore-to-full bucket.
    #[must_use]
    pub const fn full(&self) -> f64 {
        self.full
    }

    /// Upper bound of the grow bucket.
    #[must_use]
    pub const fn grow(&self) -> f64 {
        self.grow
    }

    /// Upper bound of the sink bucket.
    #[must_use]
    pub const fn sink(&self) -> f64 {
        self.sink
    }

    /// Upper bound of the food bucket.
    #[must_use]
    pub const fn food(&self) -> f64 {
        self.food
    }

    /// Selects the bucket a uniform sample falls into.
    #[must_use]
    pub fn classify(&self, sample: f64) -> LeafOutcome {
        if sample < self.full {
            LeafOutcome::RestoreFull
        } else if sample < self.grow {
            LeafOutcome::Grow
        } else if sample < self.sink {
            LeafOutcome::Sink
        } else if sample < self.food {
            LeafOutcome::SpawnFood
        } else {
            LeafOutcome::Unchanged
        }
    }
}

/// Errors that can occur when constructing a [`ProbabilityTable`].
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum TableError {
    /// A threshold lies outside the unit interval.
    #[error("threshold `{name}` must lie within 0.0..=1.0 (received {value})")]
    OutOfRange {
        /// Name of the offending threshold.
        name: &'static str,
        /// Value supplied for the threshold.
        value: f64,
    },
    /// A threshold is smaller than the one preceding it.
    #[error("threshold `{upper}` ({upper_value}) must not be below `{lower}` ({lower_value})")]
    Descending {
        /// Name of the preceding threshold.
        lower: &'static str,
        /// Value of the preceding threshold.
        lower_value: f64,
        /// Name of the threshold that breaks the ordering.
        upper: &'static str,
        /// Value of the threshold that breaks the ordering.
        upper_value: f64,
    },
}

/// Capability that produces uniform samples in `[0, 1)`.
///
/// Every per-cell decision consumes exactly one sample, so substituting the
/// source pins the whole simulation.
pub trait UniformSource {
    /// Draws the next sample.
    fn next_uniform(&mut self) -> f64;
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Uniform source that replays a fixed queue of samples.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    samples: VecDeque<f64>,
    fallback: f64,
    consumed: usize,
}

impl ScriptedSource {
    /// Creates a source that yields the provided samples in order.
    #[must_use]
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            fallback: DEFAULT_FALLBACK_SAMPLE,
            consumed: 0,
        }
    }

    /// Creates a source that always yields the same sample.
    #[must_use]
    pub fn constant(sample: f64) -> Self {
        Self::new(std::iter::empty()).with_fallback(sample)
    }

    /// Replaces the sample yielded once the queue is exhausted.
    #[must_use]
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Appends samples to the end of the queue.
    pub fn extend(&mut self, samples: impl IntoIterator<Item = f64>) {
        self.samples.extend(samples);
    }

    /// Number of samples drawn so far, fallback samples included.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of queued samples that have not been drawn yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl UniformSource for ScriptedSource {
    fn next_uniform(&mut self) -> f64 {
        self.consumed += 1;
        let sample = self.samples.pop_front().unwrap_or(self.fallback);
        sample.clamp(0.0, LARGEST_SAMPLE)
    }
}

/// Fire-and-forget receiver for audio cues.
pub trait CueSink {
    /// Plays the provided cue.
    fn play(&mut self, cue: Cue);
}

impl<F: FnMut(Cue)> CueSink for F {
    fn play(&mut self, cue: Cue) {
        self(cue)
    }
}

/// Owned copy of the complete game state handed to presentation code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Grid the leaves are laid out on.
    pub grid: Grid,
    /// Highest height level a leaf can reach.
    pub max_level: u8,
    /// Cell currently occupied by the bird.
    pub bird: Position,
    /// Leaves in row-major order, one per grid cell.
    pub leaves: Vec<Leaf>,
    /// Score accumulated during the session.
    pub score: u32,
    /// Lives left in the session.
    pub lives: u32,
    /// Lifecycle state of the session.
    pub status: SessionStatus,
    /// Number of turns processed since the session began.
    pub turn: u64,
}

impl GameSnapshot {
    /// Returns the leaf at the provided position, if it lies inside the grid.
    #[must_use]
    pub fn leaf_at(&self, position: Position) -> Option<Leaf> {
        if !self.grid.contains(position) {
            return None;
        }
        self.leaves
            .get(self.grid.position_to_index(position))
            .copied()
    }

    /// Returns the leaf the bird is standing on.
    #[must_use]
    pub fn bird_leaf(&self) -> Option<Leaf> {
        self.leaf_at(self.bird)
    }

    /// Iterates over every cell paired with its leaf in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Leaf)> + '_ {
        self.grid.positions().zip(self.leaves.iter().copied())
    }

    /// Counts the leaves that currently carry food.
    #[must_use]
    pub fn food_count(&self) -> usize {
        self.leaves.iter().filter(|leaf| leaf.has_food()).count()
    }
}
