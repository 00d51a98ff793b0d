use crate::infra::Move;
use crate::planners::rl::{DifficultyTier, MatchSummary};
use crate::state::{Grid, StepOutcome, Traversal};

/// Trait for observing match events during execution
pub trait GameObserver {
    /// Called before the first move with the traverser's starting state
    fn on_game_start(&mut self, grid: &Grid, tier: DifficultyTier, traversal: &Traversal);

    /// Called after every turn, including blocked moves
    fn on_move(&mut self, turn: usize, mv: Move, outcome: StepOutcome, traversal: &Traversal);

    /// Called once when the match ends
    fn on_game_finished(&mut self, summary: &MatchSummary);
}
