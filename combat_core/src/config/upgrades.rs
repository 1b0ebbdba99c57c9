//! Upgrade catalog loading

use super::ConfigError;
use crate::upgrade::{ApplicationMode, UpgradeCatalog, UpgradeDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for upgrade definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradesConfig {
    #[serde(rename = "upgrades")]
    pub upgrades: Vec<UpgradeDefinition>,
}

/// Load the upgrade catalog from a TOML file
pub fn load_upgrade_catalog(path: &Path) -> Result<UpgradeCatalog, ConfigError> {
    let config: UpgradesConfig = super::load_toml(path)?;
    collect(config)
}

/// Load the upgrade catalog from a TOML string
pub fn parse_upgrade_catalog(content: &str) -> Result<UpgradeCatalog, ConfigError> {
    let config: UpgradesConfig = super::parse_toml(content)?;
    collect(config)
}

/// Built-in upgrade catalog
pub fn default_upgrades() -> UpgradeCatalog {
    let toml = include_str!("../../config/upgrades.toml");
    parse_upgrade_catalog(toml).unwrap_or_else(|err| {
        tracing::warn!(%err, "built-in upgrade config invalid, using empty catalog");
        UpgradeCatalog::new()
    })
}

fn collect(config: UpgradesConfig) -> Result<UpgradeCatalog, ConfigError> {
    let mut catalog = UpgradeCatalog::new();
    for upgrade in config.upgrades {
        if !upgrade.value.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "upgrade '{}': value must be finite",
                upgrade.id
            )));
        }
        if upgrade.mode == ApplicationMode::Temporary
            && (!(upgrade.duration > 0.0) || !upgrade.duration.is_finite())
        {
            return Err(ConfigError::ValidationError(format!(
                "upgrade '{}': temporary upgrades need a positive duration",
                upgrade.id
            )));
        }
        if !(upgrade.cost_multiplier > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "upgrade '{}': cost_multiplier must be positive",
                upgrade.id
            )));
        }
        if catalog.get(&upgrade.id).is_some() {
            return Err(ConfigError::ValidationError(format!(
                "duplicate upgrade id '{}'",
                upgrade.id
            )));
        }
        catalog.insert(upgrade);
    }
    Ok(catalog)
}
