//! Purchasable upgrade definitions and purchase history

use super::{
    upgrade_cost, ApplicationMode, HandleId, UpgradeError, UpgradeManager, UpgradeTargets,
    UpgradeType, UNAFFORDABLE,
};
use crate::events::EventBus;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A shop entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    pub id: String,
    pub name: String,
    pub upgrade: UpgradeType,
    pub value: f64,
    #[serde(default = "default_mode")]
    pub mode: ApplicationMode,
    /// Seconds, only meaningful for temporary upgrades
    #[serde(default)]
    pub duration: f64,
    pub base_cost: u32,
    #[serde(default = "default_cost_multiplier")]
    pub cost_multiplier: f64,
    #[serde(default = "default_allow_multiple")]
    pub allow_multiple: bool,
}

fn default_mode() -> ApplicationMode {
    ApplicationMode::Permanent
}
fn default_cost_multiplier() -> f64 {
    1.5
}
fn default_allow_multiple() -> bool {
    true
}

impl UpgradeDefinition {
    /// Price after `purchases` earlier buys
    pub fn cost(&self, purchases: u32) -> u32 {
        upgrade_cost(self.base_cost, self.cost_multiplier, purchases, self.allow_multiple)
    }
}

/// Upgrade definitions keyed by id
#[derive(Debug, Clone, Default)]
pub struct UpgradeCatalog {
    upgrades: HashMap<String, UpgradeDefinition>,
}

impl UpgradeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = UpgradeDefinition>) -> Self {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition);
        }
        catalog
    }

    /// Insert, replacing any definition with the same id
    pub fn insert(&mut self, definition: UpgradeDefinition) {
        self.upgrades.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &str) -> Option<&UpgradeDefinition> {
        self.upgrades.get(id)
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// Ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.upgrades.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// How many times each upgrade has been bought
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseHistory {
    counts: HashMap<String, u32>,
}

impl PurchaseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, id: &str) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Price of the next purchase of `definition`
    pub fn price_of(&self, definition: &UpgradeDefinition) -> u32 {
        definition.cost(self.count(&definition.id))
    }

    /// Buy `definition` for `targets`, paying from `wallet`
    ///
    /// The wallet is only charged once the upgrade has been applied.
    #[allow(clippy::too_many_arguments)]
    pub fn try_purchase<W: UpgradeTargets + ?Sized>(
        &mut self,
        definition: &UpgradeDefinition,
        wallet: &mut u32,
        targets: &[EntityId],
        manager: &mut UpgradeManager,
        world: &mut W,
        events: &mut EventBus,
    ) -> Result<Option<HandleId>, UpgradeError> {
        let price = self.price_of(definition);
        if price == UNAFFORDABLE {
            tracing::warn!(upgrade = %definition.id, "upgrade already owned");
            return Err(UpgradeError::NotRepeatable(definition.id.clone()));
        }
        if *wallet < price {
            tracing::warn!(upgrade = %definition.id, price, wallet = *wallet, "cannot afford upgrade");
            return Err(UpgradeError::InsufficientFunds {
                cost: price,
                available: *wallet,
            });
        }

        let handle = manager.apply(
            definition.upgrade,
            definition.value,
            definition.mode,
            definition.duration,
            targets,
            world,
            events,
        )?;
        *wallet -= price;
        *self.counts.entry(definition.id.clone()).or_insert(0) += 1;
        tracing::info!(upgrade = %definition.id, price, wallet = *wallet, "upgrade purchased");
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upgrade::Upgradable;

    struct Target(f64);

    impl Upgradable for Target {
        fn can_receive(&self, upgrade: UpgradeType) -> bool {
            upgrade == UpgradeType::Attack
        }
        fn apply_upgrade(&mut self, _: UpgradeType, value: f64, _: &mut EventBus) -> Option<f64> {
            self.0 += value;
            Some(value)
        }
        fn remove_upgrade(&mut self, _: UpgradeType, value: f64, _: &mut EventBus) -> bool {
            self.0 -= value;
            true
        }
    }

    fn sharpen(allow_multiple: bool) -> UpgradeDefinition {
        UpgradeDefinition {
            id: "sharpen".to_string(),
            name: "Sharpen".to_string(),
            upgrade: UpgradeType::Attack,
            value: 2.0,
            mode: ApplicationMode::Permanent,
            duration: 0.0,
            base_cost: 50,
            cost_multiplier: 1.5,
            allow_multiple,
        }
    }

    #[test]
    fn test_purchase_charges_and_escalates() {
        let mut world: HashMap<EntityId, Target> = HashMap::new();
        world.insert(EntityId(1), Target(0.0));
        let mut manager = UpgradeManager::with_seed(50, 1);
        let mut events = EventBus::new();
        let mut history = PurchaseHistory::new();
        let mut wallet = 300;
        let def = sharpen(true);

        for _ in 0..3 {
            history
                .try_purchase(&def, &mut wallet, &[EntityId(1)], &mut manager, &mut world, &mut events)
                .unwrap();
        }
        assert_eq!(wallet, 300 - 50 - 75 - 113);
        assert_eq!(history.count("sharpen"), 3);
        assert!((world[&EntityId(1)].0 - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_insufficient_funds_keeps_wallet() {
        let mut world: HashMap<EntityId, Target> = HashMap::new();
        world.insert(EntityId(1), Target(0.0));
        let mut manager = UpgradeManager::with_seed(50, 1);
        let mut events = EventBus::new();
        let mut history = PurchaseHistory::new();
        let mut wallet = 10;

        let err = history
            .try_purchase(&sharpen(true), &mut wallet, &[EntityId(1)], &mut manager, &mut world, &mut events)
            .unwrap_err();
        assert_eq!(err, UpgradeError::InsufficientFunds { cost: 50, available: 10 });
        assert_eq!(wallet, 10);
        assert_eq!(history.count("sharpen"), 0);
    }

    #[test]
    fn test_failed_apply_is_free() {
        let mut world: HashMap<EntityId, Target> = HashMap::new();
        let mut manager = UpgradeManager::with_seed(50, 1);
        let mut events = EventBus::new();
        let mut history = PurchaseHistory::new();
        let mut wallet = 100;

        let err = history
            .try_purchase(&sharpen(true), &mut wallet, &[EntityId(4)], &mut manager, &mut world, &mut events)
            .unwrap_err();
        assert_eq!(err, UpgradeError::UnknownTarget(EntityId(4)));
        assert_eq!(wallet, 100);
    }

    #[test]
    fn test_single_purchase() {
        let mut world: HashMap<EntityId, Target> = HashMap::new();
        world.insert(EntityId(1), Target(0.0));
        let mut manager = UpgradeManager::with_seed(50, 1);
        let mut events = EventBus::new();
        let mut history = PurchaseHistory::new();
        let mut wallet = 1000;
        let def = sharpen(false);

        history
            .try_purchase(&def, &mut wallet, &[EntityId(1)], &mut manager, &mut world, &mut events)
            .unwrap();
        let err = history
            .try_purchase(&def, &mut wallet, &[EntityId(1)], &mut manager, &mut world, &mut events)
            .unwrap_err();
        assert_eq!(err, UpgradeError::NotRepeatable("sharpen".to_string()));
        assert_eq!(wallet, 950);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = UpgradeCatalog::from_definitions([sharpen(true)]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.ids(), vec!["sharpen"]);
        assert_eq!(catalog.get("sharpen").map(|d| d.cost(2)), Some(113));
        assert!(catalog.get("missing").is_none());
    }
}
