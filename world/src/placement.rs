//! Nearest-preferred-cell rule used when the bird is (re)placed.

use lily_hop_core::{Leaf, Position};

use crate::field::LeafField;

/// Finds the cell the bird should stand on when placed relative to `from`.
///
/// Full-height leaves without food win first, then any floating leaf. Ties on
/// Manhattan distance resolve to the lowest row-major index. `None` means no
/// leaf floats and the bird should stay where it is.
pub(crate) fn nearest_preferred_cell(field: &LeafField, from: Position) -> Option<Position> {
    let max_level = field.max_level();
    nearest_matching(field, from, |leaf| {
        leaf.is_full(max_level) && !leaf.has_food()
    })
    .or_else(|| nearest_matching(field, from, |leaf| !leaf.is_sunk()))
}

fn nearest_matching<F>(field: &LeafField, from: Position, accept: F) -> Option<Position>
where
    F: Fn(Leaf) -> bool,
{
    field
        .cells()
        .filter(|(_, leaf)| accept(*leaf))
        .min_by_key(|(position, _)| position.manhattan_distance(from))
        .map(|(position, _)| position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lily_hop_core::Grid;

    fn field_from(side: u32, leaves: &[(u32, u32, Leaf)]) -> LeafField {
        let mut field = LeafField::filled(Grid::new(side), 3, Leaf::sunk());
        for &(x, y, leaf) in leaves {
            field.set(Position::new(x, y), leaf);
        }
        field
    }

    #[test]
    fn prefers_full_leaf_without_food() {
        let field = field_from(
            4,
            &[
                (1, 0, Leaf::new(2, false)),
                (0, 1, Leaf::new(3, true)),
                (3, 3, Leaf::new(3, false)),
            ],
        );
        assert_eq!(
            nearest_preferred_cell(&field, Position::new(0, 0)),
            Some(Position::new(3, 3))
        );
    }

    #[test]
    fn falls_back_to_any_floating_leaf() {
        let field = field_from(4, &[(3, 0, Leaf::new(1, false)), (0, 2, Leaf::new(3, true))]);
        assert_eq!(
            nearest_preferred_cell(&field, Position::new(0, 0)),
            Some(Position::new(0, 2))
        );
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let field = field_from(3, &[(2, 1, Leaf::new(3, false)), (1, 2, Leaf::new(3, false))]);
        assert_eq!(
            nearest_preferred_cell(&field, Position::new(1, 1)),
            Some(Position::new(2, 1))
        );
    }

    #[test]
    fn current_cell_counts_as_nearest() {
        let field = field_from(3, &[(1, 1, Leaf::new(3, false)), (0, 0, Leaf::new(3, false))]);
        assert_eq!(
            nearest_preferred_cell(&field, Position::new(1, 1)),
            Some(Position::new(1, 1))
        );
    }

    #[test]
    fn reports_none_when_every_leaf_is_sunk() {
        let field = field_from(3, &[]);
        assert_eq!(nearest_preferred_cell(&field, Position::new(2, 2)), None);
    }
}
