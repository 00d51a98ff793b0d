use crate::infra::{Cell, Move};
use crate::state::{DpTable, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Goal,
    Dead,
    /// The move would leave the grid; nothing changed.
    Blocked,
}

impl StepOutcome {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepOutcome::Goal | StepOutcome::Dead)
    }
}

/// One traverser walking a grid from the start cell.
#[derive(Debug, Clone)]
pub struct Traversal {
    position: Cell,
    hp: i64,
    score: i64,
    path: Vec<Cell>,
    finished: bool,
}

impl Traversal {
    /// Start with the grid's minimal HP plus the start cell's value.
    pub fn new(grid: &Grid, dp: &DpTable) -> Self {
        let start = grid.start();
        let hp = dp.min_hp() + grid.value(0, 0) as i64;
        Self {
            position: start,
            hp,
            score: 0,
            path: vec![start],
            finished: false,
        }
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn hp(&self) -> i64 {
        self.hp
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn step(&mut self, grid: &Grid, mv: Move) -> StepOutcome {
        if self.finished {
            return StepOutcome::Blocked;
        }
        let Some(next) = grid.target(self.position, mv) else {
            return StepOutcome::Blocked;
        };

        let value = grid.value(next.row as usize, next.col as usize) as i64;
        self.position = next;
        self.path.push(next);
        self.hp += value;
        self.score += value.max(0);

        let outcome = if self.hp <= 0 {
            StepOutcome::Dead
        } else if grid.is_goal(next) {
            StepOutcome::Goal
        } else {
            StepOutcome::Moved
        };
        self.finished = outcome.is_terminal();
        outcome
    }
}
