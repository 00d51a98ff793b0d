//! Match integration - plays the trained agent through a grid

use rand::Rng;

use crate::infra::{Cell, GameObserver};
use crate::state::{DpTable, Grid, StepOutcome, Traversal};

use super::agent::{SharedAgent, lock_agent};
use super::metrics::EvaluationMetrics;
use super::tier::AgentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Goal,
    Dead,
    /// The agent kept choosing moves off the grid until the turn limit.
    TurnLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub outcome: MatchOutcome,
    pub hp: i64,
    pub score: i64,
    /// Turns taken, blocked turns included
    pub turns: usize,
    pub path: Vec<Cell>,
}

/// Game runner that uses the Q-learning agent for decisions. The agent
/// only reads its table here; nothing is learned during a match.
#[derive(Debug, Default)]
pub struct GameRunner {
    metrics: EvaluationMetrics,
}

impl GameRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play one traversal from the start cell. A blocked move costs a turn
    /// and leaves the traverser in place.
    pub fn play<R: Rng + ?Sized>(
        &mut self,
        agent: &SharedAgent,
        grid: &Grid,
        dp: &DpTable,
        config: &AgentConfig,
        rng: &mut R,
        observer: &mut dyn GameObserver,
    ) -> MatchSummary {
        let mut traversal = Traversal::new(grid, dp);
        observer.on_game_start(grid, config.tier, &traversal);

        let max_turns = grid.rows() * grid.cols() + 10;
        let mut turns = 0usize;

        let outcome = if grid.is_goal(traversal.position()) {
            MatchOutcome::Goal
        } else {
            loop {
                if turns >= max_turns {
                    break MatchOutcome::TurnLimit;
                }

                let mv = {
                    let agent = lock_agent(agent);
                    agent.choose_move(grid, traversal.position(), Some(dp), config, rng)
                };
                let step = traversal.step(grid, mv);
                turns += 1;
                observer.on_move(turns, mv, step, &traversal);

                match step {
                    StepOutcome::Goal => break MatchOutcome::Goal,
                    StepOutcome::Dead => break MatchOutcome::Dead,
                    StepOutcome::Moved | StepOutcome::Blocked => {}
                }
            }
        };

        let summary = MatchSummary {
            outcome,
            hp: traversal.hp(),
            score: traversal.score(),
            turns,
            path: traversal.path().to_vec(),
        };
        self.metrics.record_match(
            config.tier,
            summary.score,
            summary.turns,
            outcome == MatchOutcome::Goal,
            outcome == MatchOutcome::Dead,
        );
        observer.on_game_finished(&summary);
        summary
    }

    pub fn metrics(&self) -> &EvaluationMetrics {
        &self.metrics
    }

    pub fn print_summary(&self) {
        self.metrics.print_summary();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Move;
    use crate::planners::rl::{DifficultyTier, QLearningAgent, StateKey};
    use crate::state::DpSolver;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Default)]
    struct Recorder {
        started: usize,
        moves: Vec<(Move, StepOutcome)>,
        finished: Option<MatchOutcome>,
    }

    impl GameObserver for Recorder {
        fn on_game_start(&mut self, _grid: &Grid, _tier: DifficultyTier, _t: &Traversal) {
            self.started += 1;
        }

        fn on_move(&mut self, _turn: usize, mv: Move, outcome: StepOutcome, _t: &Traversal) {
            self.moves.push((mv, outcome));
        }

        fn on_game_finished(&mut self, summary: &MatchSummary) {
            self.finished = Some(summary.outcome);
        }
    }

    fn greedy() -> AgentConfig {
        AgentConfig::for_tier(DifficultyTier::Intermediate).with_epsilon(0.0)
    }

    #[test]
    fn test_trained_agent_walks_dp_path() {
        let grid = Grid::from_rows(vec![vec![0, 5, 1], vec![-3, 2, 4], vec![-8, -2, 10]]).unwrap();
        let dp = DpSolver::build(&grid);
        let agent = QLearningAgent::shared();
        let mut rng = StdRng::seed_from_u64(31);
        for _ in 0..50 {
            lock_agent(&agent).train_episode(&grid, &dp, &greedy(), &mut rng);
        }
        let episodes = lock_agent(&agent).episodes();

        let mut runner = GameRunner::new();
        let mut recorder = Recorder::default();
        let summary = runner.play(&agent, &grid, &dp, &greedy(), &mut rng, &mut recorder);

        assert_eq!(summary.outcome, MatchOutcome::Goal);
        assert_eq!(summary.path, grid.optimal_solution().1);
        assert_eq!(summary.hp, 21);
        assert_eq!(summary.score, 20);
        assert_eq!(summary.turns, 4);
        assert_eq!(recorder.started, 1);
        assert_eq!(recorder.moves.len(), 4);
        assert_eq!(recorder.finished, Some(MatchOutcome::Goal));
        // Playing does not learn
        assert_eq!(lock_agent(&agent).episodes(), episodes);
        assert_eq!(runner.metrics().num_goals, 1);
    }

    #[test]
    fn test_single_cell_match_is_won_immediately() {
        let grid = Grid::from_rows(vec![vec![7]]).unwrap();
        let dp = DpSolver::build(&grid);
        let agent = QLearningAgent::shared();
        let mut recorder = Recorder::default();

        let summary = GameRunner::new().play(
            &agent,
            &grid,
            &dp,
            &greedy(),
            &mut StdRng::seed_from_u64(32),
            &mut recorder,
        );
        assert_eq!(summary.outcome, MatchOutcome::Goal);
        assert_eq!(summary.turns, 0);
        assert_eq!(summary.hp, 8);
        assert!(recorder.moves.is_empty());
    }

    #[test]
    fn test_blocked_agent_hits_turn_limit() {
        let grid = Grid::from_rows(vec![vec![0], vec![5]]).unwrap();
        let dp = DpSolver::build(&grid);
        let agent = QLearningAgent::shared();
        {
            let mut agent = lock_agent(&agent);
            let key = StateKey::new(&grid, grid.start());
            agent
                .table_mut()
                .update(key, Move::Right, 5.0, &key, true, 1.0, 0.0);
        }

        let mut recorder = Recorder::default();
        let summary = GameRunner::new().play(
            &agent,
            &grid,
            &dp,
            &greedy(),
            &mut StdRng::seed_from_u64(33),
            &mut recorder,
        );
        assert_eq!(summary.outcome, MatchOutcome::TurnLimit);
        assert_eq!(summary.turns, 12);
        assert_eq!(summary.path, vec![grid.start()]);
        assert!(recorder.moves.iter().all(|&(_, o)| o == StepOutcome::Blocked));
    }

    #[test]
    fn test_death_is_reported() {
        let grid = Grid::from_rows(vec![vec![0, -50], vec![5, 5]]).unwrap();
        let dp = DpSolver::build(&grid);
        let agent = QLearningAgent::shared();
        {
            let mut agent = lock_agent(&agent);
            let key = StateKey::new(&grid, grid.start());
            agent
                .table_mut()
                .update(key, Move::Right, 1.0, &key, true, 1.0, 0.0);
        }

        let mut runner = GameRunner::new();
        let summary = runner.play(
            &agent,
            &grid,
            &dp,
            &greedy(),
            &mut StdRng::seed_from_u64(34),
            &mut Recorder::default(),
        );
        assert_eq!(summary.outcome, MatchOutcome::Dead);
        assert_eq!(summary.hp, -49);
        assert_eq!(runner.metrics().num_deaths, 1);
    }
}
