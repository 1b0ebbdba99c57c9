//! Core identifier and key types shared across the crate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for an entity taking part in combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Team affiliation; entities on the same team never damage each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u8);

/// Identifier for an in-flight projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(pub u64);

/// Keys of the per-entity stat ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Health,
    MaxHealth,
    Attack,
    AttackSpeed,
    EffectRange,
}

impl StatKey {
    /// Get all stat keys
    pub fn all() -> &'static [StatKey] {
        &[
            StatKey::Health,
            StatKey::MaxHealth,
            StatKey::Attack,
            StatKey::AttackSpeed,
            StatKey::EffectRange,
        ]
    }

    /// Lower bound enforced on every write (Health is additionally capped by MaxHealth)
    pub fn min_value(self) -> f64 {
        match self {
            StatKey::Health | StatKey::MaxHealth | StatKey::Attack => 0.0,
            StatKey::AttackSpeed | StatKey::EffectRange => 0.1,
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKey::Health => "health",
            StatKey::MaxHealth => "max_health",
            StatKey::Attack => "attack",
            StatKey::AttackSpeed => "attack_speed",
            StatKey::EffectRange => "effect_range",
        };
        f.write_str(name)
    }
}

/// Approximate float equality used to suppress no-op change notifications
pub fn approx_eq(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= 1e-6 * scale
}

/// Tolerance for comparing accumulated tick time against a deadline
pub const TIME_EPSILON: f64 = 1e-9;
