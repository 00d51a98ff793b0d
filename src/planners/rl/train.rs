//! Episodic training loop over freshly generated grids

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use crate::error::Result;
use crate::state::{DpSolver, GridGenerator};

use super::agent::{SharedAgent, lock_agent};
use super::metrics::{CsvLogger, TrainingMetrics};
use super::tier::AgentConfig;

/// Training configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Number of training episodes
    pub episodes: usize,
    /// Smallest generated grid side
    pub min_size: usize,
    /// Largest generated grid side
    pub max_size: usize,
    pub value_min: i32,
    pub value_max: i32,
    /// Console log frequency (episodes); 0 disables progress logging
    pub log_every: usize,
    /// Base directory for CSV metrics; `None` disables them
    pub metrics_dir: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            min_size: 3,
            max_size: 5,
            value_min: -10,
            value_max: 10,
            log_every: 50,
            metrics_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub episodes: usize,
    pub cancelled: bool,
    /// Loss of every episode, in order
    pub losses: Vec<f64>,
    /// Agent accuracy after every episode, in order
    pub accuracies: Vec<f64>,
    pub final_accuracy: f64,
    pub final_loss: f64,
}

pub struct Trainer;

impl Trainer {
    /// Train the shared agent on random grids. The agent is locked per
    /// episode and `cancel` is checked between episodes.
    ///
    /// # Panics
    ///
    /// Panics if the size or value ranges are empty or `min_size` is zero.
    pub fn run<R: Rng + ?Sized>(
        agent: &SharedAgent,
        train: &TrainConfig,
        config: &AgentConfig,
        rng: &mut R,
        cancel: &AtomicBool,
    ) -> Result<TrainingReport> {
        assert!(
            train.min_size >= 1 && train.min_size <= train.max_size,
            "invalid grid size range {}..={}",
            train.min_size,
            train.max_size
        );

        let mut logger = match &train.metrics_dir {
            Some(dir) => Some(CsvLogger::create(dir)?),
            None => None,
        };
        let mut metrics = TrainingMetrics::default();
        let mut report = TrainingReport::default();

        tracing::info!(
            "Training {} episodes as {} (alpha={}, gamma={}, epsilon={})",
            train.episodes,
            config.tier,
            config.alpha,
            config.gamma,
            config.epsilon
        );

        for episode in 1..=train.episodes {
            if cancel.load(Ordering::Relaxed) {
                tracing::warn!("Training cancelled after {} episodes", report.episodes);
                report.cancelled = true;
                break;
            }

            let rows = rng.random_range(train.min_size..=train.max_size);
            let cols = rng.random_range(train.min_size..=train.max_size);
            let grid =
                GridGenerator::generate_random(rng, rows, cols, train.value_min, train.value_max);
            let dp = DpSolver::build(&grid);

            let (summary, accuracy) = {
                let mut agent = lock_agent(agent);
                let summary = agent.run_episode(&grid, &dp, config, rng);
                (summary, agent.accuracy())
            };

            metrics.record_episode(&summary, accuracy);
            report.episodes += 1;
            report.losses.push(summary.loss);
            report.accuracies.push(accuracy);

            if let Some(logger) = logger.as_mut() {
                logger.log_episode(episode, summary.loss, accuracy)?;
            }
            if train.log_every > 0 && episode % train.log_every == 0 {
                metrics.log_to_console();
            }
        }

        if let Some(logger) = logger.as_mut() {
            logger.close();
        }

        let agent = lock_agent(agent);
        report.final_accuracy = agent.accuracy();
        report.final_loss = agent.last_loss();
        tracing::info!(
            "Training finished: {} episodes, accuracy {:.1}%, loss {:.4}",
            agent.episodes(),
            report.final_accuracy * 100.0,
            report.final_loss
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planners::rl::{DifficultyTier, QLearningAgent};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn quick(episodes: usize) -> TrainConfig {
        TrainConfig {
            episodes,
            log_every: 0,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_runs_all_episodes() {
        let agent = QLearningAgent::shared();
        let mut rng = StdRng::seed_from_u64(21);
        let cancel = AtomicBool::new(false);

        let report =
            Trainer::run(&agent, &quick(120), &AgentConfig::default(), &mut rng, &cancel).unwrap();

        assert_eq!(report.episodes, 120);
        assert!(!report.cancelled);
        assert_eq!(report.losses.len(), 120);
        assert!(report.accuracies.iter().all(|a| (0.0..=1.0).contains(a)));
        assert!(report.losses.iter().all(|l| l.is_finite() && *l >= 0.0));
        assert_eq!(lock_agent(&agent).episodes(), 120);
        assert_eq!(report.final_accuracy, *report.accuracies.last().unwrap());
    }

    #[test]
    fn test_cancel_stops_before_next_episode() {
        let agent = QLearningAgent::shared();
        let mut rng = StdRng::seed_from_u64(22);
        let cancel = AtomicBool::new(true);

        let report =
            Trainer::run(&agent, &quick(50), &AgentConfig::default(), &mut rng, &cancel).unwrap();

        assert!(report.cancelled);
        assert_eq!(report.episodes, 0);
        assert_eq!(lock_agent(&agent).episodes(), 0);
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let config = AgentConfig::for_tier(DifficultyTier::Expert);
        let run = || {
            let agent = QLearningAgent::shared();
            let mut rng = StdRng::seed_from_u64(23);
            Trainer::run(&agent, &quick(60), &config, &mut rng, &AtomicBool::new(false)).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_writes_csv_metrics() {
        let base = std::env::temp_dir().join(format!("dungeon_duel_train_{}", std::process::id()));
        let train = TrainConfig {
            metrics_dir: Some(base.clone()),
            ..quick(5)
        };
        let agent = QLearningAgent::shared();
        let mut rng = StdRng::seed_from_u64(24);

        Trainer::run(&agent, &train, &AgentConfig::default(), &mut rng, &AtomicBool::new(false))
            .unwrap();

        let run_dir = std::fs::read_dir(&base)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let loss = std::fs::read_to_string(run_dir.join("loss.csv")).unwrap();
        assert_eq!(loss.lines().count(), 6);
        assert!(run_dir.join("accuracy.csv").exists());

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_back_to_back_runs_get_separate_metrics() {
        let base =
            std::env::temp_dir().join(format!("dungeon_duel_rerun_{}", std::process::id()));
        let train = TrainConfig {
            metrics_dir: Some(base.clone()),
            ..quick(3)
        };
        let agent = QLearningAgent::shared();
        let mut rng = StdRng::seed_from_u64(25);
        let cancel = AtomicBool::new(false);

        Trainer::run(&agent, &train, &AgentConfig::default(), &mut rng, &cancel).unwrap();
        Trainer::run(&agent, &train, &AgentConfig::default(), &mut rng, &cancel).unwrap();

        let run_dirs: Vec<PathBuf> = std::fs::read_dir(&base)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(run_dirs.len(), 2);
        for run_dir in &run_dirs {
            let loss = std::fs::read_to_string(run_dir.join("loss.csv")).unwrap();
            assert_eq!(loss.lines().count(), 4, "{}", run_dir.display());
            assert_eq!(loss.lines().filter(|l| *l == "step,value").count(), 1);
        }

        std::fs::remove_dir_all(&base).unwrap();
    }
}
