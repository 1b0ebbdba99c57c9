//! Combat constants configuration

use super::ConfigError;
use crate::accuracy::{AccuracySettings, FireModeTable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable combat constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatConstants {
    #[serde(default)]
    pub damage: DamageConstants,
    #[serde(default)]
    pub accuracy: AccuracySettings,
    #[serde(default)]
    pub fire_modes: FireModeTable,
    #[serde(default)]
    pub upgrades: UpgradeConstants,
}

impl CombatConstants {
    /// Load and validate from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let constants: CombatConstants = super::load_toml(path)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Parse and validate a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let constants: CombatConstants = super::parse_toml(content)?;
        constants.validate()?;
        Ok(constants)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("damage.attack_scaling", self.damage.attack_scaling),
            ("damage.invulnerability_duration", self.damage.invulnerability_duration),
            ("accuracy.recoil_penalty", self.accuracy.recoil_penalty),
            ("accuracy.max_spread_angle", self.accuracy.max_spread_angle),
            ("accuracy.center_weight_multiplier", self.accuracy.center_weight_multiplier),
            ("accuracy.max_kick_angle", self.accuracy.max_kick_angle),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.upgrades.max_temporary_effects == 0 {
            return Err(ConfigError::ValidationError(
                "upgrades.max_temporary_effects must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageConstants {
    /// Damage added per point of attacker attack
    #[serde(default = "default_attack_scaling")]
    pub attack_scaling: f64,
    /// Seconds of immunity after taking damage (0 disables)
    #[serde(default = "default_invulnerability_duration")]
    pub invulnerability_duration: f64,
}

impl Default for DamageConstants {
    fn default() -> Self {
        DamageConstants {
            attack_scaling: default_attack_scaling(),
            invulnerability_duration: default_invulnerability_duration(),
        }
    }
}

fn default_attack_scaling() -> f64 {
    0.1
}
fn default_invulnerability_duration() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeConstants {
    /// Cap on concurrently active temporary upgrades
    #[serde(default = "default_max_temporary_effects")]
    pub max_temporary_effects: usize,
    /// Fixed seed for upgrade handles; entropy when absent
    #[serde(default)]
    pub handle_seed: Option<u64>,
}

impl Default for UpgradeConstants {
    fn default() -> Self {
        UpgradeConstants {
            max_temporary_effects: default_max_temporary_effects(),
            handle_seed: None,
        }
    }
}

fn default_max_temporary_effects() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_uses_defaults() {
        let constants = CombatConstants::parse("").unwrap();
        assert_eq!(constants, CombatConstants::default());
        assert!((constants.damage.attack_scaling - 0.1).abs() < f64::EPSILON);
        assert_eq!(constants.upgrades.max_temporary_effects, 50);
    }

    #[test]
    fn test_partial_override() {
        let toml = r#"
[damage]
invulnerability_duration = 1.25

[accuracy]
max_spread_angle = 20.0

[fire_modes.aimed]
accuracy_multiplier = 1.5
recoil_multiplier = 0.5

[upgrades]
handle_seed = 42
"#;
        let constants = CombatConstants::parse(toml).unwrap();
        assert!((constants.damage.invulnerability_duration - 1.25).abs() < f64::EPSILON);
        assert!((constants.damage.attack_scaling - 0.1).abs() < f64::EPSILON);
        assert!((constants.accuracy.max_spread_angle - 20.0).abs() < f64::EPSILON);
        assert!((constants.accuracy.recoil_penalty - 0.5).abs() < f64::EPSILON);
        assert!((constants.fire_modes.aimed.accuracy_multiplier - 1.5).abs() < f64::EPSILON);
        assert_eq!(constants.upgrades.handle_seed, Some(42));
    }

    #[test]
    fn test_validation() {
        let err = CombatConstants::parse("[damage]\nattack_scaling = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = CombatConstants::parse("[upgrades]\nmax_temporary_effects = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = CombatConstants::parse("[damage\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
