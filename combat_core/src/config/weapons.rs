//! Weapon definition loading

use super::ConfigError;
use crate::weapon::WeaponDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Container for weapon definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponsConfig {
    #[serde(rename = "weapons")]
    pub weapons: Vec<WeaponDefinition>,
}

/// Load weapon definitions from a TOML file
pub fn load_weapon_definitions(path: &Path) -> Result<HashMap<String, WeaponDefinition>, ConfigError> {
    let config: WeaponsConfig = super::load_toml(path)?;
    collect(config)
}

/// Load weapon definitions from a TOML string
pub fn parse_weapon_definitions(content: &str) -> Result<HashMap<String, WeaponDefinition>, ConfigError> {
    let config: WeaponsConfig = super::parse_toml(content)?;
    collect(config)
}

/// Built-in weapon set
pub fn default_weapons() -> HashMap<String, WeaponDefinition> {
    let toml = include_str!("../../config/weapons.toml");
    parse_weapon_definitions(toml).unwrap_or_else(|err| {
        tracing::warn!(%err, "built-in weapon config invalid, using fallback");
        let fallback = WeaponDefinition::new("pistol", "Pistol", Default::default());
        HashMap::from([(fallback.id.clone(), fallback)])
    })
}

fn collect(config: WeaponsConfig) -> Result<HashMap<String, WeaponDefinition>, ConfigError> {
    let mut map = HashMap::new();
    for weapon in config.weapons {
        validate(&weapon)?;
        if map.contains_key(&weapon.id) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate weapon id '{}'",
                weapon.id
            )));
        }
        map.insert(weapon.id.clone(), weapon);
    }
    Ok(map)
}

fn validate(weapon: &WeaponDefinition) -> Result<(), ConfigError> {
    let base = &weapon.base;
    let invalid = |what: &str| {
        Err(ConfigError::ValidationError(format!(
            "weapon '{}': {what}",
            weapon.id
        )))
    };

    if !(base.fire_rate > 0.0) {
        return invalid("fire_rate must be positive");
    }
    if !(base.damage >= 0.0) {
        return invalid("damage must not be negative");
    }
    if !(base.projectile_speed > 0.0) || !(base.projectile_lifetime > 0.0) {
        return invalid("projectile speed and lifetime must be positive");
    }
    if !(0.0..=100.0).contains(&base.accuracy) {
        return invalid("accuracy must be within 0..=100");
    }
    if !(base.recoil >= 0.0) || !(weapon.recoil_per_shot >= 0.0) {
        return invalid("recoil must not be negative");
    }
    if !(weapon.max_recoil > 0.0) || !(weapon.recovery_rate >= 0.0) {
        return invalid("max_recoil must be positive and recovery_rate non-negative");
    }
    Ok(())
}
