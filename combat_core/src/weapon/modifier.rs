//! WeaponModifier - Multiplicative effect applied to a weapon snapshot

use super::WeaponStats;
use serde::{Deserialize, Serialize};

/// Predicate deciding whether a modifier applies to the snapshot at its turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModifierCondition {
    /// Always applies
    Always,
    /// Applies while damage is at least the threshold
    MinDamage { value: f64 },
    /// Applies while damage is at most the threshold
    MaxDamage { value: f64 },
    /// Applies while fire rate is at least the threshold
    MinFireRate { value: f64 },
    /// Applies while fire rate is at most the threshold
    MaxFireRate { value: f64 },
    /// Applies while accuracy is at most the threshold
    MaxAccuracy { value: f64 },
    /// Code-defined predicate; cannot be expressed in designer data
    #[serde(skip)]
    Custom(fn(&WeaponStats) -> bool),
}

impl Default for ModifierCondition {
    fn default() -> Self {
        ModifierCondition::Always
    }
}

// Custom predicates never compare equal; function pointer identity is not stable.
impl PartialEq for ModifierCondition {
    fn eq(&self, other: &Self) -> bool {
        use ModifierCondition::*;
        match (self, other) {
            (Always, Always) => true,
            (MinDamage { value: a }, MinDamage { value: b })
            | (MaxDamage { value: a }, MaxDamage { value: b })
            | (MinFireRate { value: a }, MinFireRate { value: b })
            | (MaxFireRate { value: a }, MaxFireRate { value: b })
            | (MaxAccuracy { value: a }, MaxAccuracy { value: b }) => a == b,
            _ => false,
        }
    }
}

impl ModifierCondition {
    pub fn holds(&self, stats: &WeaponStats) -> bool {
        match *self {
            ModifierCondition::Always => true,
            ModifierCondition::MinDamage { value } => stats.damage >= value,
            ModifierCondition::MaxDamage { value } => stats.damage <= value,
            ModifierCondition::MinFireRate { value } => stats.fire_rate >= value,
            ModifierCondition::MaxFireRate { value } => stats.fire_rate <= value,
            ModifierCondition::MaxAccuracy { value } => stats.accuracy <= value,
            ModifierCondition::Custom(predicate) => predicate(stats),
        }
    }
}

/// A multiplicative weapon effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponModifier {
    /// Identifier used for removal
    pub id: String,
    /// Lower priorities apply first
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_mul")]
    pub fire_rate_mul: f64,
    #[serde(default = "default_mul")]
    pub damage_mul: f64,
    #[serde(default = "default_mul")]
    pub accuracy_mul: f64,
    #[serde(default = "default_mul")]
    pub recoil_mul: f64,
    #[serde(default)]
    pub condition: ModifierCondition,
}

fn default_mul() -> f64 {
    1.0
}

impl WeaponModifier {
    /// Identity modifier at the given priority
    pub fn new(id: impl Into<String>, priority: i32) -> Self {
        WeaponModifier {
            id: id.into(),
            priority,
            fire_rate_mul: 1.0,
            damage_mul: 1.0,
            accuracy_mul: 1.0,
            recoil_mul: 1.0,
            condition: ModifierCondition::Always,
        }
    }

    pub fn with_fire_rate(mut self, mul: f64) -> Self {
        self.fire_rate_mul = mul;
        self
    }

    pub fn with_damage(mut self, mul: f64) -> Self {
        self.damage_mul = mul;
        self
    }

    pub fn with_accuracy(mut self, mul: f64) -> Self {
        self.accuracy_mul = mul;
        self
    }

    pub fn with_recoil(mut self, mul: f64) -> Self {
        self.recoil_mul = mul;
        self
    }

    pub fn with_condition(mut self, condition: ModifierCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn is_valid_for(&self, stats: &WeaponStats) -> bool {
        self.condition.holds(stats)
    }

    /// Produce the next snapshot, or pass `stats` through if the condition fails
    pub fn apply(&self, stats: &WeaponStats) -> WeaponStats {
        if !self.is_valid_for(stats) {
            return *stats;
        }
        stats.scaled(
            self.fire_rate_mul,
            self.damage_mul,
            self.accuracy_mul,
            self.recoil_mul,
        )
    }
}

/// Presets for commonly authored modifiers
pub struct ModifierPresets;

impl ModifierPresets {
    /// Faster fire at the cost of accuracy
    pub fn rapid_fire(priority: i32) -> WeaponModifier {
        WeaponModifier::new("rapid_fire", priority)
            .with_fire_rate(1.5)
            .with_accuracy(0.85)
            .with_recoil(1.2)
    }

    /// Heavier rounds: more damage, slower fire
    pub fn heavy_rounds(priority: i32) -> WeaponModifier {
        WeaponModifier::new("heavy_rounds", priority)
            .with_damage(1.4)
            .with_fire_rate(0.8)
            .with_recoil(1.3)
    }

    /// Recoil dampening
    pub fn stabilizer(priority: i32) -> WeaponModifier {
        WeaponModifier::new("stabilizer", priority)
            .with_recoil(0.6)
            .with_accuracy(1.1)
    }
}
