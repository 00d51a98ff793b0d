//! Tabular Q-learning opponent for the dungeon grid
//!
//! The agent learns `(grid shape, position) -> [Right, Down]` action values
//! from simulated traversals and uses the DP solution of each grid both to
//! shape exploration and to grade its own accuracy.
//!
//! # Architecture
//!
//! ```text
//! Grid + DpTable
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  QLearningAgent::choose_move                                │
//! │  - epsilon exploration (uniform or DP-weighted by tier)     │
//! │  - greedy on Q values, DP-guided tie-break                  │
//! └─────────────────────────────────────────────────────────────┘
//!     │                                   │
//!     ▼                                   ▼
//! ┌───────────────────────────┐   ┌───────────────────────────┐
//! │  Trainer                  │   │  GameRunner               │
//! │  - random grids           │   │  - one traversal, no      │
//! │  - TD updates per step    │   │    learning               │
//! │  - metrics / CSV logging  │   │  - GameObserver callbacks │
//! └───────────────────────────┘   └───────────────────────────┘
//! ```

pub mod agent;
pub mod game;
pub mod metrics;
pub mod q_table;
pub mod tier;
pub mod train;

pub use agent::{EpisodeOutcome, EpisodeSummary, QLearningAgent, SharedAgent, lock_agent};
pub use game::{GameRunner, MatchOutcome, MatchSummary};
pub use metrics::{CsvLogger, EvaluationMetrics, MovingAverage, TrainingMetrics};
pub use q_table::{ActionValues, QTable, StateKey};
pub use tier::{AgentConfig, DifficultyTier};
pub use train::{TrainConfig, Trainer, TrainingReport};
