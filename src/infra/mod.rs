mod default_observer;
mod game_observer;
mod pathfinding;
mod types;

pub use default_observer::DefaultObserver;
pub use game_observer::GameObserver;
pub use pathfinding::PathSearch;
pub use types::{Cell, Move};

// ============================================================================
// Helper functions
// ============================================================================

/// Direction of a single right/down step between adjacent cells.
pub fn move_between(from: Cell, to: Cell) -> Option<Move> {
    if to.row == from.row && to.col == from.col + 1 {
        Some(Move::Right)
    } else if to.col == from.col && to.row == from.row + 1 {
        Some(Move::Down)
    } else {
        None
    }
}

/// Moves that walk a right/down path; stops at the first step that is not
/// a single right or down move.
pub fn path_to_moves(path: &[Cell]) -> Vec<Move> {
    path.windows(2)
        .map_while(|w| move_between(w[0], w[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_to_moves() {
        let path = [
            Cell::new(0, 0),
            Cell::new(0, 1),
            Cell::new(1, 1),
            Cell::new(2, 1),
        ];
        assert_eq!(path_to_moves(&path), vec![Move::Right, Move::Down, Move::Down]);
        assert!(path_to_moves(&path[..1]).is_empty());
    }

    #[test]
    fn test_move_between_rejects_other_steps() {
        assert_eq!(move_between(Cell::new(1, 1), Cell::new(1, 0)), None);
        assert_eq!(move_between(Cell::new(1, 1), Cell::new(2, 2)), None);
        assert_eq!(move_between(Cell::new(1, 1), Cell::new(2, 1)), Some(Move::Down));
    }
}
