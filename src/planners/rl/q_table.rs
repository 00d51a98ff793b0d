//! Sparse action-value table keyed by grid shape and position

use std::collections::HashMap;

use crate::infra::{Cell, Move};
use crate::state::Grid;

/// `(rows, cols, row, col)`: distinct grid shapes never share entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub rows: usize,
    pub cols: usize,
    pub row: i32,
    pub col: i32,
}

impl StateKey {
    pub fn new(grid: &Grid, cell: Cell) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            row: cell.row,
            col: cell.col,
        }
    }
}

/// Values for `[Right, Down]`.
pub type ActionValues = [f64; 2];

#[derive(Debug, Clone, Default)]
pub struct QTable {
    values: HashMap<StateKey, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action values for a state; unseen states read as `[0, 0]`.
    pub fn get(&self, key: &StateKey) -> ActionValues {
        self.values.get(key).copied().unwrap_or_default()
    }

    pub fn value(&self, key: &StateKey, mv: Move) -> f64 {
        self.get(key)[mv.index()]
    }

    pub fn max_value(&self, key: &StateKey) -> f64 {
        let [right, down] = self.get(key);
        right.max(down)
    }

    /// One-step Q-learning update; returns the TD error.
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    pub fn update(
        &mut self,
        state: StateKey,
        mv: Move,
        reward: f64,
        next_state: &StateKey,
        terminal: bool,
        alpha: f64,
        gamma: f64,
    ) -> f64 {
        let target = if terminal {
            reward
        } else {
            reward + gamma * self.max_value(next_state)
        };
        let entry = self.values.entry(state).or_default();
        let td_error = target - entry[mv.index()];
        entry[mv.index()] += alpha * td_error;
        td_error
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
