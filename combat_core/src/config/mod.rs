//! Configuration loading from TOML files

mod constants;
mod upgrades;
mod weapons;

pub use constants::{CombatConstants, DamageConstants, UpgradeConstants};
pub use upgrades::{default_upgrades, load_upgrade_catalog, parse_upgrade_catalog};
pub use weapons::{default_weapons, load_weapon_definitions, parse_weapon_definitions};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_toml(&content)
}

/// Deserialize a TOML string
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}
