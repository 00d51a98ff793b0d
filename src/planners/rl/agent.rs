//! Tabular Q-learning agent for right/down grid traversal
//!
//! The agent owns the action-value table and the training counters. All
//! hyperparameters and the difficulty tier arrive through [`AgentConfig`]
//! on every call, and every random draw comes from the caller's RNG, so a
//! seeded RNG makes move selection and training fully reproducible.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;

use crate::infra::{Cell, Move};
use crate::state::{DpTable, Grid};

use super::q_table::{QTable, StateKey};
use super::tier::{AgentConfig, DifficultyTier};

/// Action values closer than this are treated as a tie.
const TIE_EPSILON: f64 = 1e-6;
/// Chance that a Beginner tie-break goes against the DP direction.
const BEGINNER_BLUNDER_RATE: f64 = 0.3;
const ILLEGAL_MOVE_PENALTY: f64 = -25.0;
const GOAL_BONUS: f64 = 50.0;
const DEATH_PENALTY: f64 = 50.0;
/// Weight of the newest episode in the accuracy moving average.
const ACCURACY_WEIGHT: f64 = 0.05;

/// Agent shared by every caller in the process. Created once at startup;
/// the mutex serializes decisions and training episodes.
pub type SharedAgent = Arc<Mutex<QLearningAgent>>;

/// Lock the shared agent, recovering the guard from a poisoned mutex.
pub fn lock_agent(agent: &SharedAgent) -> MutexGuard<'_, QLearningAgent> {
    agent.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    Goal,
    Dead,
    OutOfBounds,
    /// Safety bound of `rows * cols + 10` steps reached.
    StepLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub outcome: EpisodeOutcome,
    pub steps: usize,
    /// Mean absolute TD error over the episode.
    pub loss: f64,
    /// Non-terminal moves that matched the DP-optimal direction.
    pub optimal_moves: usize,
    /// Non-terminal moves taken.
    pub graded_moves: usize,
}

#[derive(Debug, Clone, Default)]
pub struct QLearningAgent {
    table: QTable,
    episodes: u64,
    accuracy: f64,
    last_loss: f64,
}

impl QLearningAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedAgent {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    /// Moving average of the fraction of moves matching the DP direction.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn last_loss(&self) -> f64 {
        self.last_loss
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut QTable {
        &mut self.table
    }

    /// Forget everything learned and zero the counters.
    pub fn reset(&mut self) {
        self.table.clear();
        self.episodes = 0;
        self.accuracy = 0.0;
        self.last_loss = 0.0;
    }

    /// Pick the next move from `cell`. Reads the table without changing it.
    pub fn choose_move<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        cell: Cell,
        dp: Option<&DpTable>,
        config: &AgentConfig,
        rng: &mut R,
    ) -> Move {
        let mut exploration = config.epsilon;
        if dp.is_some() {
            exploration *= config.tier.exploration_scale();
        }

        if rng.random::<f64>() < exploration {
            if config.tier.uses_smart_exploration() {
                return smart_random_move(grid, cell, dp, rng);
            }
            return Move::ALL[rng.random_range(0..Move::ALL.len())];
        }

        let [right, down] = self.table.get(&StateKey::new(grid, cell));
        if (right - down).abs() < TIE_EPSILON {
            return break_tie(grid, cell, dp, config.tier, rng);
        }

        if right >= down { Move::Right } else { Move::Down }
    }

    /// Run one on-policy training episode and return its loss.
    pub fn train_episode<R: Rng + ?Sized>(
        &mut self,
        grid: &Grid,
        dp: &DpTable,
        config: &AgentConfig,
        rng: &mut R,
    ) -> f64 {
        self.run_episode(grid, dp, config, rng).loss
    }

    /// Simulate one traversal from the start cell, updating the table after
    /// every step, then fold the episode into the counters.
    ///
    /// # Panics
    ///
    /// Panics if `dp` was not built for a grid of the same shape.
    pub fn run_episode<R: Rng + ?Sized>(
        &mut self,
        grid: &Grid,
        dp: &DpTable,
        config: &AgentConfig,
        rng: &mut R,
    ) -> EpisodeSummary {
        assert!(
            dp.rows() == grid.rows() && dp.cols() == grid.cols(),
            "dp table shape does not match grid"
        );

        let max_steps = grid.rows() * grid.cols() + 10;
        let mut cell = grid.start();
        let mut hp = dp.min_hp() + grid.value(0, 0) as i64;
        let mut steps = 0usize;
        let mut loss_sum = 0.0;
        let mut optimal_moves = 0usize;
        let mut graded_moves = 0usize;

        let outcome = if grid.is_goal(cell) {
            EpisodeOutcome::Goal
        } else {
            loop {
                let state = StateKey::new(grid, cell);
                let action = self.choose_move(grid, cell, Some(dp), config, rng);

                let Some(next) = grid.target(cell, action) else {
                    self.table.update(
                        state,
                        action,
                        ILLEGAL_MOVE_PENALTY,
                        &state,
                        false,
                        config.alpha,
                        config.gamma,
                    );
                    loss_sum += ILLEGAL_MOVE_PENALTY.abs();
                    break EpisodeOutcome::OutOfBounds;
                };

                let value = grid.value(next.row as usize, next.col as usize) as i64;
                hp += value;
                let reached_goal = grid.is_goal(next);
                let dead = hp <= 0;

                let mut reward = value as f64;
                if reached_goal {
                    reward += GOAL_BONUS;
                }
                if dead {
                    reward -= DEATH_PENALTY;
                }
                let terminal = reached_goal || dead;

                let td_error = self.table.update(
                    state,
                    action,
                    reward,
                    &StateKey::new(grid, next),
                    terminal,
                    config.alpha,
                    config.gamma,
                );
                loss_sum += td_error.abs();

                if !terminal {
                    graded_moves += 1;
                    // Graded against the DP direction at the cell the move left from
                    if action == dp.optimal_move(cell) {
                        optimal_moves += 1;
                    }
                }

                cell = next;
                steps += 1;

                if dead {
                    break EpisodeOutcome::Dead;
                }
                if reached_goal {
                    break EpisodeOutcome::Goal;
                }
                if steps >= max_steps {
                    break EpisodeOutcome::StepLimit;
                }
            }
        };

        self.episodes += 1;
        let loss = loss_sum / steps.max(1) as f64;
        self.last_loss = loss;
        if graded_moves > 0 {
            let fraction = optimal_moves as f64 / graded_moves as f64;
            self.accuracy = (1.0 - ACCURACY_WEIGHT) * self.accuracy + ACCURACY_WEIGHT * fraction;
        }

        tracing::trace!(
            "Episode {} ended {:?} after {} steps, loss {:.3}",
            self.episodes,
            outcome,
            steps,
            loss
        );

        EpisodeSummary {
            outcome,
            steps,
            loss,
            optimal_moves,
            graded_moves,
        }
    }
}

/// Exploration for the hardest tiers: weight each legal move by
/// `value + (100 - need)` and draw from the clipped weights.
fn smart_random_move<R: Rng + ?Sized>(
    grid: &Grid,
    cell: Cell,
    dp: Option<&DpTable>,
    rng: &mut R,
) -> Move {
    let options: Vec<(Move, f64)> = Move::ALL
        .iter()
        .filter_map(|&mv| {
            let next = grid.target(cell, mv)?;
            let mut weight = grid.get(next)? as f64;
            if let Some(dp) = dp {
                weight += 100.0 - dp.need(next) as f64;
            }
            Some((mv, weight))
        })
        .collect();

    match options.as_slice() {
        [] => Move::Right,
        [(only, _)] => *only,
        _ => {
            let total: f64 = options.iter().map(|(_, w)| w.max(0.0)).sum();
            if total <= 0.0 {
                return options[rng.random_range(0..options.len())].0;
            }

            let draw = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            for &(mv, weight) in &options {
                cumulative += weight.max(0.0);
                if draw <= cumulative {
                    return mv;
                }
            }
            options[options.len() - 1].0
        }
    }
}

/// Resolve equal action values using the DP table and the tier's style.
fn break_tie<R: Rng + ?Sized>(
    grid: &Grid,
    cell: Cell,
    dp: Option<&DpTable>,
    tier: DifficultyTier,
    rng: &mut R,
) -> Move {
    let (need_right, need_down) = match dp {
        Some(dp) => (
            dp.need(cell.step(Move::Right)),
            dp.need(cell.step(Move::Down)),
        ),
        None => (i64::MAX, i64::MAX),
    };
    let optimal = if need_right <= need_down {
        Move::Right
    } else {
        Move::Down
    };

    match tier {
        DifficultyTier::Beginner => {
            if rng.random::<f64>() < BEGINNER_BLUNDER_RATE {
                optimal.opposite()
            } else {
                optimal
            }
        }
        DifficultyTier::Expert | DifficultyTier::Master if need_right == need_down => {
            let value_of = |mv: Move| {
                grid.target(cell, mv)
                    .and_then(|next| grid.get(next))
                    .map_or(f64::MIN, f64::from)
            };
            if value_of(Move::Right) >= value_of(Move::Down) {
                Move::Right
            } else {
                Move::Down
            }
        }
        _ => optimal,
    }
}
