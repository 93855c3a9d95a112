//! Dense leaf storage plus the generation and per-turn dynamics rules.

use lily_hop_core::{Grid, Leaf, LeafOutcome, Position, ProbabilityTable, UniformSource};
use log::trace;

/// Result of applying the occupied-cell rule during a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Footing {
    /// The occupied leaf still holds the bird.
    Holding,
    /// The occupied leaf dropped to the last level above water.
    Sinking,
    /// The occupied leaf is sunk and the bird has no footing.
    Lost,
}

/// Row-major array holding one leaf per grid cell.
#[derive(Clone, Debug)]
pub(crate) struct LeafField {
    grid: Grid,
    max_level: u8,
    leaves: Vec<Leaf>,
}

impl LeafField {
    /// Generates a fresh field, drawing one sample per cell in index order.
    pub(crate) fn generate<R: UniformSource + ?Sized>(
        grid: Grid,
        max_level: u8,
        table: &ProbabilityTable,
        source: &mut R,
    ) -> Self {
        let leaves = (0..grid.cell_count())
            .map(|_| initial_leaf(table.classify(source.next_uniform()), max_level))
            .collect();
        Self {
            grid,
            max_level,
            leaves,
        }
    }

    /// Creates a field where every cell holds the same leaf.
    #[cfg(any(test, feature = "leaf_scaffolding"))]
    pub(crate) fn filled(grid: Grid, max_level: u8, leaf: Leaf) -> Self {
        Self {
            grid,
            max_level,
            leaves: vec![leaf; grid.cell_count()],
        }
    }

    pub(crate) fn grid(&self) -> Grid {
        self.grid
    }

    pub(crate) fn max_level(&self) -> u8 {
        self.max_level
    }

    pub(crate) fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub(crate) fn leaf(&self, position: Position) -> Leaf {
        self.index(position)
            .and_then(|index| self.leaves.get(index).copied())
            .unwrap_or_default()
    }

    pub(crate) fn set(&mut self, position: Position, leaf: Leaf) {
        if let Some(index) = self.index(position) {
            if let Some(slot) = self.leaves.get_mut(index) {
                *slot = leaf;
            }
        }
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = (Position, Leaf)> + '_ {
        self.grid.positions().zip(self.leaves.iter().copied())
    }

    /// Applies one turn of leaf dynamics.
    ///
    /// The occupied cell sinks by one level without drawing a sample, unless
    /// it carries food, which holds it at the max level. Every other cell then
    /// draws exactly one sample in row-major order. Each cell's new state
    /// depends only on its own pre-turn state, so updating in place observes
    /// the same snapshot as a double-buffered pass.
    pub(crate) fn advance<R: UniformSource + ?Sized>(
        &mut self,
        occupied: Position,
        table: &ProbabilityTable,
        source: &mut R,
    ) -> Footing {
        let footing = self.sink_occupied(occupied);
        let occupied_index = self.index(occupied);
        let max_level = self.max_level;

        for (index, slot) in self.leaves.iter_mut().enumerate() {
            if Some(index) == occupied_index {
                continue;
            }

            let before = *slot;
            let after = steady_state_leaf(before, table.classify(source.next_uniform()), max_level);
            if after != before {
                trace!(
                    "leaf {:?}: height {} -> {}, food {} -> {}",
                    self.grid.index_to_position(index),
                    before.height(),
                    after.height(),
                    before.has_food(),
                    after.has_food()
                );
                *slot = after;
            }
        }

        footing
    }

    fn sink_occupied(&mut self, occupied: Position) -> Footing {
        let before = self.leaf(occupied);
        if before.is_sunk() {
            return Footing::Lost;
        }
        if before.has_food() {
            self.set(occupied, Leaf::new(self.max_level, true));
            return Footing::Holding;
        }

        let after = Leaf::new(before.height() - 1, false);
        trace!(
            "occupied leaf {occupied:?}: height {} -> {}",
            before.height(),
            after.height()
        );
        self.set(occupied, after);

        match after.height() {
            0 => Footing::Lost,
            1 => Footing::Sinking,
            _ => Footing::Holding,
        }
    }

    fn index(&self, position: Position) -> Option<usize> {
        if self.grid.contains(position) {
            Some(self.grid.position_to_index(position))
        } else {
            None
        }
    }
}

fn initial_leaf(outcome: LeafOutcome, max_level: u8) -> Leaf {
    match outcome {
        LeafOutcome::RestoreFull => Leaf::new(max_level, false),
        LeafOutcome::Grow => Leaf::new(max_level.saturating_sub(1), false),
        LeafOutcome::Sink => Leaf::new(1, false),
        LeafOutcome::SpawnFood => Leaf::new(max_level, true),
        LeafOutcome::Unchanged => Leaf::sunk(),
    }
}

fn steady_state_leaf(leaf: Leaf, outcome: LeafOutcome, max_level: u8) -> Leaf {
    match outcome {
        LeafOutcome::RestoreFull => Leaf::new(max_level, leaf.has_food()),
        LeafOutcome::Grow => Leaf::new(
            leaf.height().saturating_add(1).min(max_level),
            leaf.has_food(),
        ),
        LeafOutcome::Sink if !leaf.has_food() => Leaf::new(leaf.height().saturating_sub(1), false),
        LeafOutcome::SpawnFood if !leaf.is_sunk() && !leaf.has_food() => {
            Leaf::new(max_level, true)
        }
        LeafOutcome::Sink | LeafOutcome::SpawnFood | LeafOutcome::Unchanged => leaf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lily_hop_core::{ScriptedSource, INITIAL_FIELD_TABLE, MAX_LEAF_LEVEL, STEADY_STATE_TABLE};

    fn uniform_field(side: u32, leaf: Leaf) -> LeafField {
        LeafField::filled(Grid::new(side), MAX_LEAF_LEVEL, leaf)
    }

    #[test]
    fn generation_maps_each_bucket_to_a_height() {
        let mut source = ScriptedSource::new([0.0, 0.5, 0.7, 0.85, 0.95, 0.3, 0.3, 0.3, 0.3]);
        let field = LeafField::generate(Grid::new(3), MAX_LEAF_LEVEL, &INITIAL_FIELD_TABLE, &mut source);

        let leaves = field.leaves();
        assert_eq!(leaves[0], Leaf::new(3, false));
        assert_eq!(leaves[1], Leaf::new(2, false));
        assert_eq!(leaves[2], Leaf::new(1, false));
        assert_eq!(leaves[3], Leaf::new(3, true));
        assert_eq!(leaves[4], Leaf::sunk());
        assert_eq!(source.consumed(), 9);
    }

    #[test]
    fn occupied_cell_sinks_one_level_without_drawing() {
        let mut field = uniform_field(2, Leaf::new(3, false));
        let bird = Position::new(1, 1);
        let mut source = ScriptedSource::constant(0.99);

        assert_eq!(field.advance(bird, &STEADY_STATE_TABLE, &mut source), Footing::Holding);
        assert_eq!(field.leaf(bird).height(), 2);
        assert_eq!(source.consumed(), 3, "only unoccupied cells draw samples");

        assert_eq!(field.advance(bird, &STEADY_STATE_TABLE, &mut source), Footing::Sinking);
        assert_eq!(field.advance(bird, &STEADY_STATE_TABLE, &mut source), Footing::Lost);
        assert!(field.leaf(bird).is_sunk());
    }

    #[test]
    fn samples_are_consumed_in_row_major_order() {
        let mut field = uniform_field(2, Leaf::new(2, false));
        let bird = Position::new(1, 0);
        let mut source = ScriptedSource::new([0.01, 0.05, 0.10]);

        let _ = field.advance(bird, &STEADY_STATE_TABLE, &mut source);

        assert_eq!(field.leaf(Position::new(0, 0)), Leaf::new(3, false));
        assert_eq!(field.leaf(Position::new(1, 0)), Leaf::new(1, false));
        assert_eq!(field.leaf(Position::new(0, 1)), Leaf::new(3, false));
        assert_eq!(field.leaf(Position::new(1, 1)), Leaf::new(1, false));
    }

    #[test]
    fn growth_is_capped_at_max_level() {
        let grown = steady_state_leaf(Leaf::new(3, false), LeafOutcome::Grow, 3);
        assert_eq!(grown.height(), 3);
        let surfaced = steady_state_leaf(Leaf::sunk(), LeafOutcome::Grow, 3);
        assert_eq!(surfaced.height(), 1);
    }

    #[test]
    fn sinking_stops_at_zero_and_skips_food() {
        assert_eq!(steady_state_leaf(Leaf::sunk(), LeafOutcome::Sink, 3), Leaf::sunk());
        let fed = Leaf::new(3, true);
        assert_eq!(steady_state_leaf(fed, LeafOutcome::Sink, 3), fed);
    }

    #[test]
    fn food_spawns_only_on_floating_leaves_without_food() {
        assert_eq!(
            steady_state_leaf(Leaf::new(1, false), LeafOutcome::SpawnFood, 3),
            Leaf::new(3, true)
        );
        assert_eq!(
            steady_state_leaf(Leaf::sunk(), LeafOutcome::SpawnFood, 3),
            Leaf::sunk()
        );
        let fed = Leaf::new(3, true);
        assert_eq!(steady_state_leaf(fed, LeafOutcome::SpawnFood, 3), fed);
    }

    #[test]
    fn restoring_keeps_food() {
        let fed = Leaf::new(3, true);
        assert_eq!(steady_state_leaf(fed, LeafOutcome::RestoreFull, 3), fed);
    }

    #[test]
    fn occupied_food_leaf_holds_at_max_level() {
        let mut field = uniform_field(2, Leaf::sunk());
        let bird = Position::new(1, 0);
        field.set(bird, Leaf::new(MAX_LEAF_LEVEL, true));
        let mut source = ScriptedSource::constant(0.99);

        for _ in 0..4 {
            assert_eq!(field.advance(bird, &STEADY_STATE_TABLE, &mut source), Footing::Holding);
            assert_eq!(field.leaf(bird), Leaf::new(MAX_LEAF_LEVEL, true));
        }
    }

    #[test]
    fn stranded_bird_loses_footing_every_turn() {
        let mut field = uniform_field(2, Leaf::sunk());
        let mut source = ScriptedSource::constant(0.99);
        assert_eq!(
            field.advance(Position::new(0, 0), &STEADY_STATE_TABLE, &mut source),
            Footing::Lost
        );
    }
}
