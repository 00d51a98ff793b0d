//! Difficulty tiers and the hyperparameters the agent reads at decision time

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DifficultyTier {
    Beginner,
    #[default]
    Intermediate,
    Expert,
    Master,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::Beginner,
        DifficultyTier::Intermediate,
        DifficultyTier::Expert,
        DifficultyTier::Master,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "Beginner",
            DifficultyTier::Intermediate => "Intermediate",
            DifficultyTier::Expert => "Expert",
            DifficultyTier::Master => "Master",
        }
    }

    /// Multiplier applied to epsilon when a DP table is available.
    pub fn exploration_scale(self) -> f64 {
        match self {
            DifficultyTier::Beginner => 1.5,
            DifficultyTier::Master => 0.5,
            _ => 1.0,
        }
    }

    /// The two hardest tiers explore with weighted smart-random moves.
    pub fn uses_smart_exploration(self) -> bool {
        matches!(self, DifficultyTier::Expert | DifficultyTier::Master)
    }

    /// Tile value range used when generating grids for this tier.
    pub fn value_range(self) -> (i32, i32) {
        match self {
            DifficultyTier::Beginner => (-5, 15),
            DifficultyTier::Intermediate => (-10, 20),
            DifficultyTier::Expert => (-20, 25),
            DifficultyTier::Master => (-30, 30),
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        DifficultyTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::InvalidTier(trimmed.to_string()))
    }
}

/// Hyperparameters passed into every decision and training call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentConfig {
    pub tier: DifficultyTier,
    /// Learning rate α
    pub alpha: f64,
    /// Discount factor γ
    pub gamma: f64,
    /// Base exploration rate ε
    pub epsilon: f64,
}

impl AgentConfig {
    /// Preset hyperparameters for a tier.
    pub fn for_tier(tier: DifficultyTier) -> Self {
        let (epsilon, alpha, gamma) = match tier {
            DifficultyTier::Beginner => (0.4, 0.1, 0.8),
            DifficultyTier::Intermediate => (0.2, 0.2, 0.9),
            DifficultyTier::Expert => (0.1, 0.3, 0.95),
            DifficultyTier::Master => (0.05, 0.4, 0.98),
        };
        Self {
            tier,
            alpha,
            gamma,
            epsilon,
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tier: DifficultyTier::Intermediate,
            alpha: 0.2,
            gamma: 0.95,
            epsilon: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tier() {
        assert_eq!("master".parse::<DifficultyTier>().unwrap(), DifficultyTier::Master);
        assert_eq!(" Expert ".parse::<DifficultyTier>().unwrap(), DifficultyTier::Expert);
        assert!(matches!(
            "Nightmare".parse::<DifficultyTier>(),
            Err(Error::InvalidTier(_))
        ));
        for tier in DifficultyTier::ALL {
            assert_eq!(tier.to_string().parse::<DifficultyTier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_presets() {
        let beginner = AgentConfig::for_tier(DifficultyTier::Beginner);
        let master = AgentConfig::for_tier(DifficultyTier::Master);
        assert!(beginner.epsilon > master.epsilon);
        assert!(beginner.alpha < master.alpha);
        assert!(beginner.gamma < master.gamma);

        let default = AgentConfig::default();
        assert_eq!(default.tier, DifficultyTier::Intermediate);
        assert_eq!(default.epsilon, 0.15);
    }
}
