#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lily Hop.
//!
//! The world owns the leaf field, the bird, score, lives, and the session
//! status. It only changes through [`apply`], which executes one [`Command`]
//! to completion and reports what happened as [`Event`] values.

mod field;
mod placement;

use lily_hop_core::{
    Command, Direction, Event, Grid, Landing, Leaf, MoveRejection, Position, ProbabilityTable,
    SessionStatus, UniformSource, FOOD_BONUS, GRID_SIDE, HOP_SCORE, INITIAL_FIELD_TABLE,
    INITIAL_LIVES, MAX_LEAF_LEVEL, STEADY_STATE_TABLE,
};
use log::debug;

use crate::field::{Footing, LeafField};

/// Tuning values the world is constructed with.
///
/// [`Config::default`] reproduces the fixed constant table from
/// `lily-hop-core`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Number of cells along each side of the grid.
    pub grid_side: u32,
    /// Highest height level a leaf can reach.
    pub max_level: u8,
    /// Lives granted whenever a session starts.
    pub initial_lives: u32,
    /// Score awarded for a hop onto an ordinary leaf.
    pub hop_score: u32,
    /// Score awarded for collecting food.
    pub food_bonus: u32,
    /// Thresholds used to generate a fresh leaf field.
    pub initial_table: ProbabilityTable,
    /// Thresholds applied to unoccupied leaves once per turn.
    pub steady_table: ProbabilityTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_side: GRID_SIDE,
            max_level: MAX_LEAF_LEVEL,
            initial_lives: INITIAL_LIVES,
            hop_score: HOP_SCORE,
            food_bonus: FOOD_BONUS,
            initial_table: INITIAL_FIELD_TABLE,
            steady_table: STEADY_STATE_TABLE,
        }
    }
}

/// Represents the authoritative Lily Hop world state.
#[derive(Clone, Debug)]
pub struct World {
    config: Config,
    field: LeafField,
    bird: Position,
    score: u32,
    lives: u32,
    status: SessionStatus,
    turn: u64,
}

impl World {
    /// Creates a world waiting on the start screen with a freshly generated field.
    #[must_use]
    pub fn new<R: UniformSource + ?Sized>(config: Config, source: &mut R) -> Self {
        let config = Config {
            max_level: config.max_level.max(1),
            ..config
        };
        let field = generate_field(&config, source);
        let bird = placement::nearest_preferred_cell(&field, ORIGIN).unwrap_or(ORIGIN);
        Self {
            config,
            field,
            bird,
            score: 0,
            lives: config.initial_lives,
            status: SessionStatus::StartScreen,
            turn: 0,
        }
    }

    fn reinitialize<R: UniformSource + ?Sized>(&mut self, source: &mut R) {
        self.field = generate_field(&self.config, source);
        self.bird = placement::nearest_preferred_cell(&self.field, ORIGIN).unwrap_or(ORIGIN);
        self.score = 0;
        self.lives = self.config.initial_lives;
        self.turn = 0;
    }

    fn transition(&mut self, to: SessionStatus, out_events: &mut Vec<Event>) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        debug!("session status {from:?} -> {to:?}");
        out_events.push(Event::StatusChanged { from, to });
    }

    fn advance_turn<R: UniformSource + ?Sized>(
        &mut self,
        source: &mut R,
        out_events: &mut Vec<Event>,
    ) {
        self.turn = self.turn.saturating_add(1);
        out_events.push(Event::TurnAdvanced { turn: self.turn });

        let footing = self
            .field
            .advance(self.bird, &self.config.steady_table, source);
        debug!(
            "turn {} processed, bird at {:?} on height {}",
            self.turn,
            self.bird,
            self.field.leaf(self.bird).height()
        );

        match footing {
            Footing::Holding => {}
            Footing::Sinking => out_events.push(Event::LeafSinking { cell: self.bird }),
            Footing::Lost => self.lose_life(out_events),
        }
    }

    fn move_bird(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.status != SessionStatus::Playing {
            out_events.push(Event::MoveRejected {
                direction,
                reason: MoveRejection::NotPlaying,
            });
            return;
        }

        let from = self.bird;
        let to = self.field.grid().step(from, direction);
        if to == from {
            out_events.push(Event::MoveRejected {
                direction,
                reason: MoveRejection::Wall,
            });
            return;
        }

        self.bird = to;
        out_events.push(Event::BirdMoved { from, to });

        let leaf = self.field.leaf(to);
        let landing = if leaf.is_sunk() {
            Landing::Sunk
        } else if leaf.has_food() {
            self.field.set(to, Leaf::new(leaf.height(), false));
            self.score = self.score.saturating_add(self.config.food_bonus);
            Landing::Food
        } else {
            self.score = self.score.saturating_add(self.config.hop_score);
            Landing::Leaf
        };

        out_events.push(Event::BirdLanded {
            cell: to,
            landing,
            score: self.score,
        });

        if landing == Landing::Sunk {
            self.lose_life(out_events);
        }
    }

    fn lose_life(&mut self, out_events: &mut Vec<Event>) {
        self.lives = self.lives.saturating_sub(1);
        debug!("life lost at {:?}, {} remaining", self.bird, self.lives);

        if self.lives == 0 {
            self.transition(SessionStatus::GameOver, out_events);
            out_events.push(Event::GameOver { score: self.score });
        } else {
            self.transition(SessionStatus::LifeLost, out_events);
            out_events.push(Event::LifeLost {
                lives_remaining: self.lives,
            });
        }
    }

    fn continue_after_life_loss(&mut self, out_events: &mut Vec<Event>) {
        let from = self.bird;
        let to = placement::nearest_preferred_cell(&self.field, from).unwrap_or(from);
        self.bird = to;
        out_events.push(Event::BirdRespawned { from, to });
        self.transition(SessionStatus::Playing, out_events);
        out_events.push(Event::TurnClockReset);
    }
}

const ORIGIN: Position = Position::new(0, 0);

fn generate_field<R: UniformSource + ?Sized>(config: &Config, source: &mut R) -> LeafField {
    LeafField::generate(
        Grid::new(config.grid_side),
        config.max_level,
        &config.initial_table,
        source,
    )
}

/// Applies the provided command to the world.
///
/// Commands that do not fit the current session status leave the world
/// untouched. Randomness is drawn from `source` only while generating a field
/// or processing a turn.
pub fn apply<R: UniformSource + ?Sized>(
    world: &mut World,
    command: Command,
    source: &mut R,
    out_events: &mut Vec<Event>,
) {
    match (command, world.status) {
        (Command::StartGame, SessionStatus::StartScreen) => {
            world.transition(SessionStatus::Playing, out_events);
            out_events.push(Event::TurnClockReset);
        }
        (Command::Restart, SessionStatus::GameOver) => {
            world.reinitialize(source);
            out_events.push(Event::FieldRegenerated);
            world.transition(SessionStatus::Playing, out_events);
            out_events.push(Event::TurnClockReset);
        }
        (Command::ContinueAfterLifeLoss, SessionStatus::LifeLost) => {
            world.continue_after_life_loss(out_events);
        }
        (Command::AdvanceTurn, SessionStatus::Playing) => {
            world.advance_turn(source, out_events);
        }
        (Command::MoveBird { direction }, _) => world.move_bird(direction, out_events),
        (
            Command::StartGame
            | Command::Restart
            | Command::ContinueAfterLifeLoss
            | Command::AdvanceTurn,
            _,
        ) => {}
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use lily_hop_core::{GameSnapshot, Grid, Leaf, Position, SessionStatus};

    /// Current lifecycle state of the session.
    #[must_use]
    pub fn status(world: &World) -> SessionStatus {
        world.status
    }

    /// Cell currently occupied by the bird.
    #[must_use]
    pub fn bird(world: &World) -> Position {
        world.bird
    }

    /// Score accumulated during the session.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Lives left in the session.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Number of turns processed since the session began.
    #[must_use]
    pub fn turn(world: &World) -> u64 {
        world.turn
    }

    /// Grid the leaves are laid out on.
    #[must_use]
    pub fn grid(world: &World) -> Grid {
        world.field.grid()
    }

    /// Configuration the world was constructed with.
    #[must_use]
    pub fn config(world: &World) -> &super::Config {
        &world.config
    }

    /// Leaf at the provided position. Cells outside the grid read as sunk.
    #[must_use]
    pub fn leaf(world: &World, position: Position) -> Leaf {
        world.field.leaf(position)
    }

    /// Leaves in row-major order.
    #[must_use]
    pub fn leaves(world: &World) -> &[Leaf] {
        world.field.leaves()
    }

    /// Captures an owned copy of the complete game state.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        GameSnapshot {
            grid: world.field.grid(),
            max_level: world.config.max_level,
            bird: world.bird,
            leaves: world.field.leaves().to_vec(),
            score: world.score,
            lives: world.lives,
            status: world.status,
            turn: world.turn,
        }
    }
}

/// Helpers that arrange world state directly for tests and tooling.
#[cfg(any(test, feature = "leaf_scaffolding"))]
pub mod scaffolding {
    use super::{field::LeafField, World};
    use lily_hop_core::{Leaf, Position};

    /// Replaces every leaf in the field with the provided one.
    pub fn fill_leaves(world: &mut World, leaf: Leaf) {
        world.field = LeafField::filled(world.field.grid(), world.config.max_level, leaf);
    }

    /// Replaces the leaf at a single position.
    pub fn set_leaf(world: &mut World, position: Position, leaf: Leaf) {
        world.field.set(position, leaf);
    }

    /// Moves the bird without any validation or scoring.
    pub fn place_bird(world: &mut World, position: Position) {
        if world.field.grid().contains(position) {
            world.bird = position;
        }
    }

    /// Overrides the remaining lives.
    pub fn set_lives(world: &mut World, lives: u32) {
        world.lives = lives;
    }
}
