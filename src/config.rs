//! Runtime configuration read from `DUNGEON_*` environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::planners::rl::{AgentConfig, DifficultyTier, TrainConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub tier: DifficultyTier,
    pub rows: usize,
    pub cols: usize,
    /// Seed for every random draw; `None` seeds from the OS
    pub seed: Option<u64>,
    pub agent: AgentConfig,
    pub train: TrainConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let tier = DifficultyTier::default();
        Self {
            tier,
            rows: 5,
            cols: 5,
            seed: None,
            agent: AgentConfig::for_tier(tier),
            train: TrainConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys keep their defaults;
    /// present but malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(tier) = lookup("DUNGEON_TIER") {
            config.tier = tier.parse()?;
            config.agent = AgentConfig::for_tier(config.tier);
        }
        if let Some(rows) = parse_setting(&lookup, "DUNGEON_ROWS")? {
            config.rows = positive("DUNGEON_ROWS", rows)?;
        }
        if let Some(cols) = parse_setting(&lookup, "DUNGEON_COLS")? {
            config.cols = positive("DUNGEON_COLS", cols)?;
        }
        if let Some(episodes) = parse_setting(&lookup, "DUNGEON_EPISODES")? {
            config.train.episodes = episodes;
        }
        config.seed = parse_setting(&lookup, "DUNGEON_SEED")?;

        if let Some(alpha) = parse_setting(&lookup, "DUNGEON_ALPHA")? {
            config.agent.alpha = in_range("DUNGEON_ALPHA", alpha, f64::EPSILON, 1.0)?;
        }
        if let Some(gamma) = parse_setting(&lookup, "DUNGEON_GAMMA")? {
            config.agent.gamma = in_range("DUNGEON_GAMMA", gamma, 0.0, 1.0)?;
        }
        if let Some(epsilon) = parse_setting(&lookup, "DUNGEON_EPSILON")? {
            config.agent.epsilon = in_range("DUNGEON_EPSILON", epsilon, 0.0, 1.0)?;
        }
        if let Some(dir) = lookup("DUNGEON_METRICS_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.train.metrics_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }
}

fn parse_setting<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|_| Error::InvalidSetting {
        key: key.to_string(),
        value: raw,
    })
}

fn positive(key: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(Error::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn in_range(key: &str, value: f64, min: f64, max: f64) -> Result<f64> {
    if !(min..=max).contains(&value) {
        return Err(Error::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}
