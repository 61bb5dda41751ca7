//! Engine configuration.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use trivia_rules::DifficultyProfile;

use crate::error::ConfigError;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// How a player picks where a roll takes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MovementMode {
    /// Pick the final node among all legal destinations.
    #[default]
    Destination,
    /// Walk the roll, choosing a branch at every intersection.
    Stepwise,
}

/// Configuration for one game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub player_count: usize,

    pub movement_mode: MovementMode,

    /// Difficulty weights for questions on normal nodes.
    pub normal_difficulty: DifficultyProfile,

    /// Difficulty weights for questions on wedge nodes.
    pub wedge_difficulty: DifficultyProfile,

    /// Difficulty weights for every steal duel question.
    pub duel_difficulty: DifficultyProfile,

    /// Seed for difficulty sampling. Unseeded sessions draw from the OS.
    pub rng_seed: Option<u64>,

    /// Slot offset scale relative to the smaller footprint side.
    pub slot_size_ratio: f32,

    /// Slot offset scale for nodes without a footprint.
    pub default_slot_size: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            player_count: MAX_PLAYERS,
            movement_mode: MovementMode::Destination,
            normal_difficulty: DifficultyProfile::NORMAL,
            wedge_difficulty: DifficultyProfile::HARD_BIASED,
            duel_difficulty: DifficultyProfile::HARD_BIASED,
            rng_seed: None,
            slot_size_ratio: 0.2,
            default_slot_size: 0.05,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML configuration. Missing keys keep defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_player_count(mut self, player_count: usize) -> Self {
        self.player_count = player_count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_movement_mode(mut self, mode: MovementMode) -> Self {
        self.movement_mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount {
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
                found: self.player_count,
            });
        }

        for (name, profile) in [
            ("normal_difficulty", &self.normal_difficulty),
            ("wedge_difficulty", &self.wedge_difficulty),
            ("duel_difficulty", &self.duel_difficulty),
        ] {
            if !profile.is_valid() {
                return Err(ConfigError::EmptyProfile(name));
            }
        }

        if self.slot_size_ratio <= 0.0 || self.default_slot_size <= 0.0 {
            return Err(ConfigError::SlotSize);
        }
        Ok(())
    }

    /// Random source for this session.
    pub fn rng(&self) -> Pcg32 {
        seeded_rng(self.rng_seed)
    }
}

/// A `Pcg32` from `seed`, or from the thread RNG when there is none.
pub fn seeded_rng(seed: Option<u64>) -> Pcg32 {
    match seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.normal_difficulty, DifficultyProfile::NORMAL);
        assert_eq!(config.wedge_difficulty, DifficultyProfile::HARD_BIASED);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            player_count = 2
            movement_mode = "stepwise"
            rng_seed = 99

            [duel_difficulty]
            easy = 0
            medium = 0
            hard = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.player_count, 2);
        assert_eq!(config.movement_mode, MovementMode::Stepwise);
        assert_eq!(config.rng_seed, Some(99));
        assert_eq!(config.duel_difficulty, DifficultyProfile::new(0, 0, 1));
        assert_eq!(config.normal_difficulty, DifficultyProfile::NORMAL);
    }

    #[test]
    fn test_invalid_player_count() {
        let result = EngineConfig::from_toml_str("player_count = 5");
        assert!(matches!(result, Err(ConfigError::PlayerCount { found: 5, .. })));
    }

    #[test]
    fn test_empty_profile_rejected() {
        let mut config = EngineConfig::default();
        config.wedge_difficulty = DifficultyProfile::new(0, 0, 0);
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::EmptyProfile("wedge_difficulty")
        );
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = seeded_rng(Some(3));
        let mut b = seeded_rng(Some(3));
        let left: u32 = a.random();
        let right: u32 = b.random();
        assert_eq!(left, right);
    }
}
