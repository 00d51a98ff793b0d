use crate::infra::{Cell, Move};
use crate::state::Grid;

/// Minimal HP required on entering each cell to still reach the goal.
///
/// Every entry is at least 1. Built once per grid and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpTable {
    rows: usize,
    cols: usize,
    need: Vec<i64>,
}

impl DpTable {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// HP needed on entering `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn get(&self, row: usize, col: usize) -> i64 {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) out of bounds");
        self.need[row * self.cols + col]
    }

    /// HP needed on entering `cell`, `i64::MAX` when the cell is off the grid.
    pub fn need(&self, cell: Cell) -> i64 {
        if cell.row < 0
            || cell.col < 0
            || cell.row as usize >= self.rows
            || cell.col as usize >= self.cols
        {
            return i64::MAX;
        }
        self.need[cell.row as usize * self.cols + cell.col as usize]
    }

    /// Minimal starting HP for the whole grid.
    pub fn min_hp(&self) -> i64 {
        self.need[0]
    }

    /// Direction of the cheaper successor; ties and the goal favor Right.
    pub fn optimal_move(&self, from: Cell) -> Move {
        let need_right = self.need(from.step(Move::Right));
        let need_down = self.need(from.step(Move::Down));
        if need_right <= need_down {
            Move::Right
        } else {
            Move::Down
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, i64)> + '_ {
        let cols = self.cols;
        self.need
            .iter()
            .enumerate()
            .map(move |(i, &n)| (Cell::new((i / cols) as i32, (i % cols) as i32), n))
    }
}

pub struct DpSolver;

impl DpSolver {
    /// Fill the table bottom-up from the goal: last row right to left, last
    /// column bottom to top, then the interior in reverse row-major order.
    pub fn build(grid: &Grid) -> DpTable {
        let m = grid.rows();
        let n = grid.cols();
        let mut need = vec![0i64; m * n];
        let idx = |r: usize, c: usize| r * n + c;
        let value = |r: usize, c: usize| grid.value(r, c) as i64;

        need[idx(m - 1, n - 1)] = (1 - value(m - 1, n - 1)).max(1);

        for c in (0..n - 1).rev() {
            need[idx(m - 1, c)] = (need[idx(m - 1, c + 1)] - value(m - 1, c)).max(1);
        }
        for r in (0..m - 1).rev() {
            need[idx(r, n - 1)] = (need[idx(r + 1, n - 1)] - value(r, n - 1)).max(1);
        }
        for r in (0..m - 1).rev() {
            for c in (0..n - 1).rev() {
                let next = need[idx(r + 1, c)].min(need[idx(r, c + 1)]);
                need[idx(r, c)] = (next - value(r, c)).max(1);
            }
        }

        tracing::debug!("Solved {}x{} grid, min hp {}", m, n, need[0]);

        DpTable {
            rows: m,
            cols: n,
            need,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grid(rows: Vec<Vec<i32>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_classic_example() {
        let g = grid(vec![vec![-2, -3, 3], vec![-5, -10, 1], vec![10, 30, -5]]);
        let dp = DpSolver::build(&g);
        assert_eq!(dp.min_hp(), 7);
        assert_eq!(dp.get(2, 2), 6);
        assert_eq!(dp.get(1, 1), 11);
        assert_eq!(dp.get(0, 2), 2);
    }

    #[test]
    fn test_single_cell() {
        assert_eq!(DpSolver::build(&grid(vec![vec![-4]])).min_hp(), 5);
        assert_eq!(DpSolver::build(&grid(vec![vec![0]])).min_hp(), 1);
        assert_eq!(DpSolver::build(&grid(vec![vec![12]])).min_hp(), 1);
    }

    #[test]
    fn test_single_row_and_column() {
        let row = DpSolver::build(&grid(vec![vec![-1, -2, -3]]));
        assert_eq!(row.min_hp(), 7);
        let col = DpSolver::build(&grid(vec![vec![5], vec![-10], vec![1]]));
        assert_eq!(col.get(1, 0), 11);
        assert_eq!(col.min_hp(), 6);
    }

    #[test]
    fn test_recurrence_holds_on_random_grids() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let m = rng.random_range(1..=6);
            let n = rng.random_range(1..=6);
            let g = Grid::from_fn(m, n, |_, _| rng.random_range(-20..=20));
            let dp = DpSolver::build(&g);

            assert_eq!(dp.get(m - 1, n - 1), (1 - g.value(m - 1, n - 1) as i64).max(1));
            for (cell, need) in dp.iter() {
                assert!(need >= 1);
                if cell == g.goal() {
                    continue;
                }
                let best = dp
                    .need(cell.step(Move::Right))
                    .min(dp.need(cell.step(Move::Down)));
                let v = g.value(cell.row as usize, cell.col as usize) as i64;
                assert_eq!(need, (best - v).max(1));
            }

            assert_eq!(dp, DpSolver::build(&g));
        }
    }

    #[test]
    fn test_optimal_move_prefers_cheaper_successor() {
        let g = grid(vec![vec![-2, -3, 3], vec![-5, -10, 1], vec![10, 30, -5]]);
        let dp = DpSolver::build(&g);
        assert_eq!(dp.optimal_move(Cell::new(0, 0)), Move::Right);
        assert_eq!(dp.optimal_move(Cell::new(0, 2)), Move::Down);
        assert_eq!(dp.optimal_move(Cell::new(2, 0)), Move::Right);
        assert_eq!(dp.need(Cell::new(0, 3)), i64::MAX);
    }
}
