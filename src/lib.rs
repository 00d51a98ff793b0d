pub mod config;
pub mod error;
pub mod infra;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{Error, Result};
pub use infra::{Cell, Move, PathSearch};
pub use planners::rl::{AgentConfig, DifficultyTier, QLearningAgent, SharedAgent};
pub use state::{DpSolver, DpTable, Grid, GridGenerator};
