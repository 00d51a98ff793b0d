#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn distance(&self, other: &Cell) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    pub fn neighbors(&self) -> [Cell; 4] {
        [
            Cell::new(self.row - 1, self.col), // Up
            Cell::new(self.row + 1, self.col), // Down
            Cell::new(self.row, self.col - 1), // Left
            Cell::new(self.row, self.col + 1), // Right
        ]
    }

    pub fn neighbors_with_diagonals(&self) -> [Cell; 8] {
        [
            Cell::new(self.row - 1, self.col - 1),
            Cell::new(self.row - 1, self.col),
            Cell::new(self.row - 1, self.col + 1),
            Cell::new(self.row, self.col - 1),
            Cell::new(self.row, self.col + 1),
            Cell::new(self.row + 1, self.col - 1),
            Cell::new(self.row + 1, self.col),
            Cell::new(self.row + 1, self.col + 1),
        ]
    }

    pub fn step(&self, mv: Move) -> Cell {
        match mv {
            Move::Right => Cell::new(self.row, self.col + 1),
            Move::Down => Cell::new(self.row + 1, self.col),
        }
    }
}

/// The two moves a traverser may make. The discriminant doubles as the
/// action index into an action-value pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Right = 0,
    Down = 1,
}

impl Move {
    pub const ALL: [Move; 2] = [Move::Right, Move::Down];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Move {
        match self {
            Move::Right => Move::Down,
            Move::Down => Move::Right,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Right => "right",
            Move::Down => "down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_manhattan() {
        let a = Cell::new(0, 0);
        let b = Cell::new(2, 3);
        assert_eq!(a.distance(&b), 5);
        assert_eq!(b.distance(&a), 5);
    }

    #[test]
    fn test_step() {
        let c = Cell::new(1, 1);
        assert_eq!(c.step(Move::Right), Cell::new(1, 2));
        assert_eq!(c.step(Move::Down), Cell::new(2, 1));
        assert_eq!(Move::Right.opposite(), Move::Down);
        assert_eq!(Move::Down.index(), 1);
    }
}
