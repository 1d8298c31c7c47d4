//! Match Configuration
//!
//! Tunables for fighters, the CPU opponent and round flow. Durations are
//! in simulation ticks; distances and speeds are fixed-point but read and
//! written as plain decimals in JSON.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::fixed::{
    self, Fixed, FIXED_ONE,
    DEFAULT_MOVE_SPEED, DEFAULT_ATTACK_RANGE, DEFAULT_ATTACK_RADIUS, DEFAULT_BODY_RADIUS,
    DEFAULT_ENGAGEMENT_THRESHOLD, STAGE_HALF_WIDTH, STAGE_HALF_HEIGHT, MAX_STAGE_HALF_EXTENT,
};

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed
    #[error("failed to parse match config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Per-fighter tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterConfig {
    /// Movement speed (units/second)
    #[serde(with = "fixed::as_decimal")]
    pub speed: Fixed,
    /// Length of the forward attack sweep
    #[serde(with = "fixed::as_decimal")]
    pub attack_range: Fixed,
    /// Radius of the attack sweep
    #[serde(with = "fixed::as_decimal")]
    pub attack_radius: Fixed,
    /// Radius of the fighter's body for hit tests
    #[serde(with = "fixed::as_decimal")]
    pub body_radius: Fixed,
    /// Hits the fighter can take per round
    pub max_health: u32,
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_MOVE_SPEED,
            attack_range: DEFAULT_ATTACK_RANGE,
            attack_radius: DEFAULT_ATTACK_RADIUS,
            body_radius: DEFAULT_BODY_RADIUS,
            max_health: 5,
        }
    }
}

/// CPU opponent tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Attack only when closer than this
    #[serde(with = "fixed::as_decimal")]
    pub engagement_threshold: Fixed,
    /// Minimum ticks between attack attempts
    pub attack_cooldown_ticks: u32,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            engagement_threshold: DEFAULT_ENGAGEMENT_THRESHOLD,
            attack_cooldown_ticks: 120, // 2 seconds
        }
    }
}

/// Clip lengths used by the headless animation stand-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTimings {
    /// Ticks from attack start to "attack animation complete"
    pub attack_ticks: u32,
    /// Ticks from hit to "hit animation complete"
    pub hit_ticks: u32,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            attack_ticks: 24,
            hit_ticks: 18,
        }
    }
}

/// Configuration for a whole match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Rounds a side must win to take the match
    pub rounds_to_win: u32,
    /// Delay between a knockout and the round/match transition
    pub ko_transition_delay_ticks: u32,
    /// Length of the pre-round countdown
    pub countdown_ticks: u32,
    /// Stage half-width (positions are clamped to the stage)
    #[serde(with = "fixed::as_decimal")]
    pub stage_half_width: Fixed,
    /// Stage half-height
    #[serde(with = "fixed::as_decimal")]
    pub stage_half_height: Fixed,
    /// Horizontal distance of each spawn point from the stage centre
    #[serde(with = "fixed::as_decimal")]
    pub spawn_offset: Fixed,
    /// Human-controlled fighter
    pub human: FighterConfig,
    /// CPU-controlled fighter
    pub cpu: FighterConfig,
    /// CPU decision tunables
    pub cpu_policy: CpuConfig,
    /// Headless animation clip lengths
    pub animation: AnimationTimings,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rounds_to_win: 3,
            ko_transition_delay_ticks: 60, // 1 second
            countdown_ticks: 180,          // 3 seconds
            stage_half_width: STAGE_HALF_WIDTH,
            stage_half_height: STAGE_HALF_HEIGHT,
            spawn_offset: 4 * FIXED_ONE,
            human: FighterConfig::default(),
            cpu: FighterConfig::default(),
            cpu_policy: CpuConfig::default(),
            animation: AnimationTimings::default(),
        }
    }
}

impl MatchConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    ///
    /// Stage extents and reaches are capped at [`MAX_STAGE_HALF_EXTENT`]
    /// so every in-stage position and sweep end stays inside `Fixed`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if self.rounds_to_win == 0 {
            return invalid("rounds_to_win", "must be at least 1");
        }
        if self.stage_half_width <= 0 || self.stage_half_height <= 0 {
            return invalid("stage_half_width/stage_half_height", "must be positive");
        }
        if self.stage_half_width > MAX_STAGE_HALF_EXTENT || self.stage_half_height > MAX_STAGE_HALF_EXTENT {
            return invalid("stage_half_width/stage_half_height", "must not exceed 1024");
        }
        if self.spawn_offset < 0 || self.spawn_offset > self.stage_half_width {
            return invalid("spawn_offset", "must lie within the stage");
        }
        if self.cpu_policy.engagement_threshold <= 0
            || self.cpu_policy.engagement_threshold > MAX_STAGE_HALF_EXTENT
        {
            return invalid("cpu_policy.engagement_threshold", "must be positive and at most 1024");
        }

        for (field, fighter) in [("human", &self.human), ("cpu", &self.cpu)] {
            if fighter.max_health == 0 {
                return invalid(field, "max_health must be at least 1");
            }
            if fighter.speed <= 0 {
                return invalid(field, "speed must be positive");
            }
            if fighter.attack_range < 0 || fighter.attack_radius <= 0 || fighter.body_radius <= 0 {
                return invalid(field, "attack and body dimensions must be positive");
            }
            if [fighter.attack_range, fighter.attack_radius, fighter.body_radius]
                .iter()
                .any(|d| *d > MAX_STAGE_HALF_EXTENT)
            {
                return invalid(field, "attack and body dimensions must not exceed 1024");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;

    #[test]
    fn test_default_config_is_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rounds_to_win, 3);
        assert_eq!(config.cpu_policy.attack_cooldown_ticks, 120);
        assert_eq!(config.ko_transition_delay_ticks, 60);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "rounds_to_win": 2,
            "human": { "speed": 7.5, "max_health": 3 },
            "cpu_policy": { "engagement_threshold": 1.25 }
        }"#;
        let config = MatchConfig::from_json_str(json).unwrap();

        assert_eq!(config.rounds_to_win, 2);
        assert_eq!(config.human.speed, to_fixed(7.5));
        assert_eq!(config.human.max_health, 3);
        assert_eq!(config.human.attack_range, DEFAULT_ATTACK_RANGE);
        assert_eq!(config.cpu_policy.engagement_threshold, to_fixed(1.25));
        assert_eq!(config.cpu_policy.attack_cooldown_ticks, 120);
        assert_eq!(config.cpu, FighterConfig::default());
    }

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let config = MatchConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(MatchConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = MatchConfig::from_json_str(r#"{ "rounds_to_win": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "rounds_to_win", .. }));

        let err = MatchConfig::from_json_str(r#"{ "cpu": { "max_health": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cpu", .. }));

        let err = MatchConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_stage_and_reach_capped() {
        let wide = MatchConfig::from_json_str(
            r#"{ "stage_half_width": 100.0, "spawn_offset": 95.0 }"#,
        ).unwrap();
        assert_eq!(wide.stage_half_width, to_fixed(100.0));

        let err = MatchConfig::from_json_str(r#"{ "stage_half_width": 5000.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "stage_half_width/stage_half_height", .. }));

        let err = MatchConfig::from_json_str(r#"{ "stage_half_height": 1024.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "stage_half_width/stage_half_height", .. }));

        let err = MatchConfig::from_json_str(r#"{ "human": { "attack_range": 2000.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "human", .. }));

        let err = MatchConfig::from_json_str(
            r#"{ "cpu_policy": { "engagement_threshold": 4096.0 } }"#,
        ).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cpu_policy.engagement_threshold", .. }));

        // The cap itself is allowed
        let edge = MatchConfig::from_json_str(r#"{ "stage_half_width": 1024.0 }"#).unwrap();
        assert_eq!(edge.stage_half_width, MAX_STAGE_HALF_EXTENT);
    }
}
