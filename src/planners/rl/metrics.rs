//! Metrics and CSV logging for Q-learning training

use std::collections::{HashMap, VecDeque};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use time::{OffsetDateTime, format_description};

use crate::error::{Error, Result};

use super::agent::{EpisodeOutcome, EpisodeSummary};
use super::tier::DifficultyTier;

/// Moving average calculator
#[derive(Debug, Clone)]
pub struct MovingAverage {
    values: VecDeque<f64>,
    window_size: usize,
    sum: f64,
}

impl MovingAverage {
    pub fn new(window_size: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(window_size),
            window_size,
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.window_size {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.values.push_back(value);
        self.sum += value;
    }

    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Training metrics tracker
#[derive(Debug)]
pub struct TrainingMetrics {
    /// Per-episode loss
    pub loss: MovingAverage,
    /// Agent accuracy after each episode
    pub accuracy: MovingAverage,
    /// Episode lengths
    pub episode_lengths: MovingAverage,
    /// Fraction of episodes reaching the goal
    pub goal_rate: MovingAverage,
    /// Fraction of episodes ending with hp <= 0
    pub death_rate: MovingAverage,
    pub episodes: usize,
    pub total_steps: usize,
    start_time: Instant,
}

impl TrainingMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            loss: MovingAverage::new(window_size),
            accuracy: MovingAverage::new(window_size),
            episode_lengths: MovingAverage::new(window_size),
            goal_rate: MovingAverage::new(window_size),
            death_rate: MovingAverage::new(window_size),
            episodes: 0,
            total_steps: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a finished episode and the agent accuracy that followed it
    pub fn record_episode(&mut self, summary: &EpisodeSummary, accuracy: f64) {
        self.episodes += 1;
        self.total_steps += summary.steps;
        self.loss.push(summary.loss);
        self.accuracy.push(accuracy);
        self.episode_lengths.push(summary.steps as f64);
        self.goal_rate
            .push(if summary.outcome == EpisodeOutcome::Goal { 1.0 } else { 0.0 });
        self.death_rate
            .push(if summary.outcome == EpisodeOutcome::Dead { 1.0 } else { 0.0 });
    }

    pub fn training_duration_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn episodes_per_second(&self) -> f64 {
        let duration = self.training_duration_secs();
        if duration > 0.0 {
            self.episodes as f64 / duration
        } else {
            0.0
        }
    }

    /// Log current metrics to console
    pub fn log_to_console(&self) {
        tracing::info!(
            "Episode {} | Steps {} | EPS {:.1}",
            self.episodes,
            self.total_steps,
            self.episodes_per_second()
        );
        tracing::info!(
            "  Loss={:.4}, accuracy={:.1}%, length={:.1}, goal={:.1}%, death={:.1}%",
            self.loss.average(),
            self.accuracy.average() * 100.0,
            self.episode_lengths.average(),
            self.goal_rate.average() * 100.0,
            self.death_rate.average() * 100.0
        );
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Writes `step,value` series, one CSV file per tag, into a run directory.
pub struct CsvLogger {
    log_dir: PathBuf,
}

impl CsvLogger {
    /// Create a fresh `<base>/run-<timestamp>` and log into it. A run started
    /// in the same second gets a `-1`, `-2`, ... suffix instead of sharing
    /// the directory.
    pub fn create(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        fs::create_dir_all(base).map_err(|source| Error::Io {
            operation: format!("create metrics directory {}", base.display()),
            source,
        })?;

        let stamp = run_stamp();
        let mut attempt = 0usize;
        loop {
            let name = match attempt {
                0 => format!("run-{stamp}"),
                n => format!("run-{stamp}-{n}"),
            };
            let log_dir = base.join(name);
            match fs::create_dir(&log_dir) {
                Ok(()) => return Ok(Self { log_dir }),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => {
                    return Err(Error::Io {
                        operation: format!("create metrics directory {}", log_dir.display()),
                        source,
                    });
                }
            }
        }
    }

    /// Log into `log_dir` directly, creating it if needed.
    pub fn in_dir(log_dir: impl Into<PathBuf>) -> Result<Self> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir).map_err(|source| Error::Io {
            operation: format!("create metrics directory {}", log_dir.display()),
            source,
        })?;
        Ok(Self { log_dir })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Append one value to `<tag>.csv`, writing the header on first use.
    pub fn log_scalar(&mut self, tag: &str, value: f64, step: usize) -> Result<()> {
        let csv_path = self.log_dir.join(format!("{}.csv", tag.replace('/', "_")));
        let io_error = |source: std::io::Error| Error::Io {
            operation: format!("append to {}", csv_path.display()),
            source,
        };

        let file_exists = csv_path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&csv_path)
            .map_err(io_error)?;
        if !file_exists {
            writeln!(file, "step,value").map_err(io_error)?;
        }
        writeln!(file, "{},{}", step, value).map_err(io_error)
    }

    pub fn log_episode(&mut self, step: usize, loss: f64, accuracy: f64) -> Result<()> {
        self.log_scalar("loss", loss, step)?;
        self.log_scalar("accuracy", accuracy, step)
    }

    pub fn close(&mut self) {
        tracing::info!("Training metrics saved to {}", self.log_dir.display());
    }
}

fn run_stamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_description::parse("[year][month][day]-[hour][minute][second]")
        .ok()
        .and_then(|format| now.format(&format).ok())
        .unwrap_or_else(|| now.unix_timestamp().to_string())
}

/// Evaluation metrics over played matches
#[derive(Debug, Clone, Default)]
pub struct EvaluationMetrics {
    pub num_matches: usize,
    pub num_goals: usize,
    pub num_deaths: usize,
    pub total_score: i64,
    pub total_steps: usize,
    /// Per-tier statistics
    pub tier_stats: HashMap<DifficultyTier, TierStats>,
}

#[derive(Debug, Clone, Default)]
pub struct TierStats {
    pub attempts: usize,
    pub goals: usize,
    pub total_score: i64,
}

impl EvaluationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_match(
        &mut self,
        tier: DifficultyTier,
        score: i64,
        steps: usize,
        reached_goal: bool,
        died: bool,
    ) {
        self.num_matches += 1;
        self.total_score += score;
        self.total_steps += steps;
        if reached_goal {
            self.num_goals += 1;
        }
        if died {
            self.num_deaths += 1;
        }

        let stats = self.tier_stats.entry(tier).or_default();
        stats.attempts += 1;
        stats.total_score += score;
        if reached_goal {
            stats.goals += 1;
        }
    }

    pub fn avg_score(&self) -> f64 {
        if self.num_matches > 0 {
            self.total_score as f64 / self.num_matches as f64
        } else {
            0.0
        }
    }

    pub fn goal_rate(&self) -> f64 {
        if self.num_matches > 0 {
            self.num_goals as f64 / self.num_matches as f64
        } else {
            0.0
        }
    }

    pub fn death_rate(&self) -> f64 {
        if self.num_matches > 0 {
            self.num_deaths as f64 / self.num_matches as f64
        } else {
            0.0
        }
    }

    pub fn avg_steps(&self) -> f64 {
        if self.num_matches > 0 {
            self.total_steps as f64 / self.num_matches as f64
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        tracing::info!("=== Evaluation Summary ===");
        tracing::info!("Matches: {}", self.num_matches);
        tracing::info!("Avg Score: {:.2}", self.avg_score());
        tracing::info!("Goal Rate: {:.1}%", self.goal_rate() * 100.0);
        tracing::info!("Death Rate: {:.1}%", self.death_rate() * 100.0);
        tracing::info!("Avg Steps: {:.1}", self.avg_steps());

        for tier in DifficultyTier::ALL {
            let Some(stats) = self.tier_stats.get(&tier) else {
                continue;
            };
            let goal_rate = stats.goals as f64 / stats.attempts.max(1) as f64 * 100.0;
            tracing::info!(
                "  {}: {} matches, {:.1}% goals, avg_score={:.2}",
                tier,
                stats.attempts,
                goal_rate,
                stats.total_score as f64 / stats.attempts.max(1) as f64
            );
        }
    }
}
