use tracing::{debug, info};

use crate::infra::{GameObserver, Move};
use crate::planners::rl::{DifficultyTier, MatchSummary};
use crate::state::{Grid, StepOutcome, Traversal};

pub struct DefaultObserver;

impl GameObserver for DefaultObserver {
    fn on_game_start(&mut self, grid: &Grid, tier: DifficultyTier, traversal: &Traversal) {
        info!("Match started against {} agent", tier);
        info!("- grid size: {}x{}", grid.rows(), grid.cols());
        info!("- starting hp: {}", traversal.hp());
    }

    fn on_move(&mut self, turn: usize, mv: Move, outcome: StepOutcome, traversal: &Traversal) {
        let pos = traversal.position();
        match outcome {
            StepOutcome::Blocked => debug!(
                "turn {}: {} blocked at ({}, {})",
                turn,
                mv.as_str(),
                pos.row,
                pos.col
            ),
            _ => info!(
                "turn {}: {} -> ({}, {}), hp: {}, score: {}",
                turn,
                mv.as_str(),
                pos.row,
                pos.col,
                traversal.hp(),
                traversal.score()
            ),
        }
    }

    fn on_game_finished(&mut self, summary: &MatchSummary) {
        info!("Match finished with outcome: {:?}", summary.outcome);
        info!("Final hp: {}, score: {}, turns: {}", summary.hp, summary.score, summary.turns);
    }
}
