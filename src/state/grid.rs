use std::fmt;

use crate::error::{Error, Result};
use crate::infra::{Cell, Move};
use crate::planners::rl::DifficultyTier;
use crate::state::DpSolver;

/// Cells whose absolute value exceeds this are considered special.
const SPECIAL_THRESHOLD: i32 = 20;

/// Summary statistics computed once when a grid is built.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAnalysis {
    pub total: i64,
    pub average: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub min: i32,
    pub max: i32,
    /// Higher means harder.
    pub difficulty_score: f64,
}

impl GridAnalysis {
    fn compute(values: &[i32]) -> Self {
        let mut total = 0i64;
        let mut positive_count = 0;
        let mut negative_count = 0;
        let mut min = i32::MAX;
        let mut max = i32::MIN;

        for &value in values {
            total += value as i64;
            if value > 0 {
                positive_count += 1;
            }
            if value < 0 {
                negative_count += 1;
            }
            min = min.min(value);
            max = max.max(value);
        }

        let cells = values.len() as f64;
        let average = total as f64 / cells;
        let negative_ratio = negative_count as f64 / cells;
        let range = (max as i64 - min as i64) as f64;
        let difficulty_score = negative_ratio * 50.0 + range / 10.0 - average;

        Self {
            total,
            average,
            positive_count,
            negative_count,
            min,
            max,
            difficulty_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyRating {
    Trivial,
    Easy,
    Normal,
    Hard,
    Expert,
    Nightmare,
}

impl DifficultyRating {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 10.0 => DifficultyRating::Trivial,
            s if s < 20.0 => DifficultyRating::Easy,
            s if s < 35.0 => DifficultyRating::Normal,
            s if s < 50.0 => DifficultyRating::Hard,
            s if s < 75.0 => DifficultyRating::Expert,
            _ => DifficultyRating::Nightmare,
        }
    }
}

impl fmt::Display for DifficultyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Immutable M×N matrix of tile values, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    values: Vec<i32>,
    analysis: GridAnalysis,
    special_cells: Vec<Cell>,
    safe_cells: Vec<Cell>,
    difficulty_label: Option<DifficultyTier>,
}

impl Grid {
    /// Build a grid from caller-supplied rows.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(Error::EmptyGrid);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(Error::RaggedRow {
                row,
                expected,
                got: r.len(),
            });
        }

        let height = rows.len();
        Ok(Self::build(height, expected, rows.into_iter().flatten().collect()))
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> i32,
    {
        assert!(rows >= 1 && cols >= 1, "grid dimensions must be at least 1x1");
        let mut values = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                values.push(f(r, c));
            }
        }
        Self::build(rows, cols, values)
    }

    /// The fixed 5×5 dungeon used when no grid is configured.
    pub fn default_dungeon() -> Self {
        const LAYOUT: [[i32; 5]; 5] = [
            [-2, -3, 3, 8, -5],
            [-5, -10, 1, -2, 12],
            [10, 30, -5, -8, 3],
            [-1, 5, -15, 20, -3],
            [7, -4, 2, -1, 10],
        ];
        Self::from_fn(5, 5, |r, c| LAYOUT[r][c])
    }

    fn build(rows: usize, cols: usize, values: Vec<i32>) -> Self {
        let analysis = GridAnalysis::compute(&values);
        let mut special_cells = Vec::new();
        let mut safe_cells = Vec::new();

        for (index, &value) in values.iter().enumerate() {
            let cell = Cell::new((index / cols) as i32, (index % cols) as i32);
            if value.abs() > SPECIAL_THRESHOLD || value == 0 {
                special_cells.push(cell);
            }
            if value >= 0 {
                safe_cells.push(cell);
            }
        }

        Self {
            rows,
            cols,
            values,
            analysis,
            special_cells,
            safe_cells,
            difficulty_label: None,
        }
    }

    pub(crate) fn with_difficulty_label(mut self, tier: DifficultyTier) -> Self {
        self.difficulty_label = Some(tier);
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Cell {
        Cell::new(0, 0)
    }

    pub fn goal(&self) -> Cell {
        Cell::new(self.rows as i32 - 1, self.cols as i32 - 1)
    }

    pub fn is_goal(&self, cell: Cell) -> bool {
        cell == self.goal()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as usize) < self.rows
            && (cell.col as usize) < self.cols
    }

    /// Value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn value(&self, row: usize, col: usize) -> i32 {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) out of bounds");
        self.values[row * self.cols + col]
    }

    pub fn get(&self, cell: Cell) -> Option<i32> {
        self.contains(cell)
            .then(|| self.values[cell.row as usize * self.cols + cell.col as usize])
    }

    pub fn analysis(&self) -> &GridAnalysis {
        &self.analysis
    }

    pub fn special_cells(&self) -> &[Cell] {
        &self.special_cells
    }

    pub fn safe_cells(&self) -> &[Cell] {
        &self.safe_cells
    }

    pub fn difficulty_label(&self) -> Option<DifficultyTier> {
        self.difficulty_label
    }

    pub fn difficulty_rating(&self) -> DifficultyRating {
        DifficultyRating::from_score(self.analysis.difficulty_score)
    }

    /// Population variance of the tile values.
    pub fn value_variance(&self) -> f64 {
        let avg = self.analysis.average;
        let sum: f64 = self
            .values
            .iter()
            .map(|&v| (v as f64 - avg).powi(2))
            .sum();
        sum / self.values.len() as f64
    }

    /// In-bounds neighbors of `cell`, 4-connected or 8-connected.
    pub fn valid_moves(&self, cell: Cell, allow_diagonal: bool) -> Vec<Cell> {
        if allow_diagonal {
            cell.neighbors_with_diagonals()
                .into_iter()
                .filter(|n| self.contains(*n))
                .collect()
        } else {
            cell.neighbors()
                .into_iter()
                .filter(|n| self.contains(*n))
                .collect()
        }
    }

    /// True when `cell` is on the grid and entering it with `hp` leaves the
    /// traverser alive.
    pub fn is_position_safe(&self, cell: Cell, hp: i64) -> bool {
        self.get(cell).is_some_and(|v| v as i64 + hp > 0)
    }

    /// Minimum starting HP and the right/down route that achieves it.
    pub fn optimal_solution(&self) -> (i64, Vec<Cell>) {
        let dp = DpSolver::build(self);
        let mut current = self.start();
        let mut path = vec![current];

        while current != self.goal() {
            current = current.step(dp.optimal_move(current));
            path.push(current);
        }

        (dp.min_hp(), path)
    }

    /// Cell the traverser would enter, or `None` if the move leaves the grid.
    pub fn target(&self, from: Cell, mv: Move) -> Option<Cell> {
        let next = from.step(mv);
        self.contains(next).then_some(next)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let line: Vec<String> = (0..self.cols)
                .map(|col| format!("{:>4}", self.value(row, col)))
                .collect();
            writeln!(f, "{}", line.join(""))?;
        }
        Ok(())
    }
}
