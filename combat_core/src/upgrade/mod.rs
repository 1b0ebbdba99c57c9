//! Upgrades and buffs - Permanent and timed stat changes

mod catalog;
mod cost;
mod manager;

pub use catalog::{PurchaseHistory, UpgradeCatalog, UpgradeDefinition};
pub use cost::{upgrade_cost, UNAFFORDABLE};
pub use manager::{fresh_handle, RemovalCause, TemporaryRecord, UpgradeManager};

use crate::events::EventBus;
use crate::types::{EntityId, StatKey};
use crate::weapon::WeaponStat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// What an upgrade changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeType {
    MaxHealth,
    Attack,
    AttackSpeed,
    EffectRange,
    WeaponDamage,
    WeaponFireRate,
    WeaponAccuracy,
    WeaponRecoil,
}

impl UpgradeType {
    /// Ledger stat this upgrade changes, if any
    pub fn stat_key(self) -> Option<StatKey> {
        match self {
            UpgradeType::MaxHealth => Some(StatKey::MaxHealth),
            UpgradeType::Attack => Some(StatKey::Attack),
            UpgradeType::AttackSpeed => Some(StatKey::AttackSpeed),
            UpgradeType::EffectRange => Some(StatKey::EffectRange),
            _ => None,
        }
    }

    /// Weapon stat this upgrade changes, if any
    pub fn weapon_stat(self) -> Option<WeaponStat> {
        match self {
            UpgradeType::WeaponDamage => Some(WeaponStat::Damage),
            UpgradeType::WeaponFireRate => Some(WeaponStat::FireRate),
            UpgradeType::WeaponAccuracy => Some(WeaponStat::Accuracy),
            UpgradeType::WeaponRecoil => Some(WeaponStat::Recoil),
            _ => None,
        }
    }
}

impl fmt::Display for UpgradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// How long an upgrade lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMode {
    /// Mutates the target's baseline; no handle
    Permanent,
    /// Registered with a handle and removed on expiry or cancellation
    Temporary,
}

/// Handle of a live temporary upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upgrade#{:016x}", self.0)
    }
}

/// Recoverable upgrade failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpgradeError {
    #[error("no targets given")]
    NoTargets,
    #[error("target {0} does not exist")]
    UnknownTarget(EntityId),
    #[error("target {target} cannot receive {upgrade}")]
    UnsupportedType {
        target: EntityId,
        upgrade: UpgradeType,
    },
    #[error("upgrade value must be finite, got {0}")]
    InvalidValue(f64),
    #[error("temporary duration must be positive, got {0}")]
    InvalidDuration(f64),
    #[error("temporary effect limit of {0} reached")]
    CapacityReached(usize),
    #[error("upgrade {0} cannot be purchased again")]
    NotRepeatable(String),
    #[error("costs {cost}, wallet has {available}")]
    InsufficientFunds { cost: u32, available: u32 },
}

/// Something that accepts typed upgrade values
///
/// Implementors apply and revert raw values; handle bookkeeping for timed
/// upgrades lives in [`UpgradeManager`], which reverts the delta reported by
/// `apply_upgrade` rather than the requested value.
pub trait Upgradable {
    /// Whether this target understands the upgrade type
    fn can_receive(&self, upgrade: UpgradeType) -> bool;

    /// Apply `value`; returns the change actually made after clamping, or
    /// `None` if the type is not supported
    fn apply_upgrade(&mut self, upgrade: UpgradeType, value: f64, events: &mut EventBus) -> Option<f64>;

    /// Revert a previously applied `value`
    fn remove_upgrade(&mut self, upgrade: UpgradeType, value: f64, events: &mut EventBus) -> bool;
}

/// Lookup of upgrade targets by entity id
pub trait UpgradeTargets {
    fn target_mut(&mut self, id: EntityId) -> Option<&mut dyn Upgradable>;

    fn target(&self, id: EntityId) -> Option<&dyn Upgradable>;
}

impl<U: Upgradable> UpgradeTargets for HashMap<EntityId, U> {
    fn target_mut(&mut self, id: EntityId) -> Option<&mut dyn Upgradable> {
        self.get_mut(&id).map(|u| u as &mut dyn Upgradable)
    }

    fn target(&self, id: EntityId) -> Option<&dyn Upgradable> {
        self.get(&id).map(|u| u as &dyn Upgradable)
    }
}

impl<U: Upgradable> UpgradeTargets for BTreeMap<EntityId, U> {
    fn target_mut(&mut self, id: EntityId) -> Option<&mut dyn Upgradable> {
        self.get_mut(&id).map(|u| u as &mut dyn Upgradable)
    }

    fn target(&self, id: EntityId) -> Option<&dyn Upgradable> {
        self.get(&id).map(|u| u as &dyn Upgradable)
    }
}
