mod dp;
mod generator;
mod grid;
mod traversal;

pub use dp::{DpSolver, DpTable};
pub use generator::{GOAL_MIN_REWARD, GridGenerator};
pub use grid::{DifficultyRating, Grid, GridAnalysis};
pub use traversal::{StepOutcome, Traversal};
