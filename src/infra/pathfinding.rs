use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::infra::Cell;
use crate::state::Grid;

#[derive(Clone, Eq, PartialEq)]
struct Node {
    cell: Cell,
    hp: i64,
    score: i64,
    seq: usize, // Insertion order, earlier wins on equal score
    path: Vec<Cell>,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// HP-constrained best-first search over the grid.
///
/// The frontier is ordered by `-hp + manhattan(goal)`. This is a greedy
/// heuristic, not an admissible one: the returned route is survivable but
/// not necessarily the cheapest.
pub struct PathSearch;

impl PathSearch {
    /// 4-connected search from `start` to `goal`. An empty result means no
    /// survivable route was found.
    pub fn find(grid: &Grid, start: Cell, goal: Cell, initial_hp: i64) -> Vec<Cell> {
        Self::find_with_options(grid, start, goal, initial_hp, false)
    }

    pub fn find_with_options(
        grid: &Grid,
        start: Cell,
        goal: Cell,
        initial_hp: i64,
        allow_diagonal: bool,
    ) -> Vec<Cell> {
        if !grid.contains(start) || !grid.contains(goal) {
            return Vec::new();
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set: HashSet<Cell> = HashSet::new();
        let mut seq = 0usize;

        open_set.push(Node {
            cell: start,
            hp: initial_hp,
            score: score(start, initial_hp, goal),
            seq,
            path: vec![start],
        });

        while let Some(Node { cell: current, hp, path, .. }) = open_set.pop() {
            if current == goal && hp > 0 {
                return path;
            }

            if closed_set.contains(&current) {
                continue;
            }
            closed_set.insert(current);

            for neighbor in grid.valid_moves(current, allow_diagonal) {
                if closed_set.contains(&neighbor) {
                    continue;
                }

                let Some(value) = grid.get(neighbor) else {
                    continue;
                };
                let next_hp = hp.saturating_add(value as i64);
                if next_hp <= 0 && neighbor != goal {
                    continue;
                }

                let mut next_path = path.clone();
                next_path.push(neighbor);
                seq += 1;
                open_set.push(Node {
                    cell: neighbor,
                    hp: next_hp,
                    score: score(neighbor, next_hp, goal),
                    seq,
                    path: next_path,
                });
            }
        }

        tracing::debug!(
            "No survivable path from {:?} to {:?} with {} hp",
            start,
            goal,
            initial_hp
        );
        Vec::new()
    }
}

fn score(cell: Cell, hp: i64, goal: Cell) -> i64 {
    (cell.distance(&goal) as i64).saturating_sub(hp)
}
