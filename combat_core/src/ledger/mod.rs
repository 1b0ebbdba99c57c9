//! StatLedger - Per-entity numeric stats with clamping invariants

mod invulnerability;

pub use invulnerability::{InvulnerabilityState, InvulnerabilityWindow};

use crate::events::{CombatEvent, EventBus};
use crate::types::{approx_eq, EntityId, StatKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Starting values for a new ledger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    #[serde(default = "default_max_health")]
    pub max_health: f64,
    #[serde(default)]
    pub attack: f64,
    #[serde(default = "default_one")]
    pub attack_speed: f64,
    #[serde(default = "default_one")]
    pub effect_range: f64,
}

fn default_max_health() -> f64 {
    100.0
}

fn default_one() -> f64 {
    1.0
}

impl Default for BaseStats {
    fn default() -> Self {
        BaseStats {
            max_health: default_max_health(),
            attack: 0.0,
            attack_speed: 1.0,
            effect_range: 1.0,
        }
    }
}

/// Mutable stat store owned by one entity
///
/// Every write goes through [`StatLedger::set`], which clamps the value and
/// publishes a [`CombatEvent::StatChanged`] only when the value really changed.
/// Invariants after any operation:
/// - `0 <= Health <= MaxHealth`
/// - `AttackSpeed >= 0.1`, `EffectRange >= 0.1`
/// - `Attack >= 0`, `MaxHealth >= 0`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatLedger {
    owner: EntityId,
    values: HashMap<StatKey, f64>,
    dead: bool,
}

impl StatLedger {
    /// Create a ledger at full health
    pub fn new(owner: EntityId, base: BaseStats) -> Self {
        let max_health = base.max_health.max(0.0);
        let mut values = HashMap::new();
        values.insert(StatKey::MaxHealth, max_health);
        values.insert(StatKey::Health, max_health);
        values.insert(StatKey::Attack, base.attack.max(StatKey::Attack.min_value()));
        values.insert(
            StatKey::AttackSpeed,
            base.attack_speed.max(StatKey::AttackSpeed.min_value()),
        );
        values.insert(
            StatKey::EffectRange,
            base.effect_range.max(StatKey::EffectRange.min_value()),
        );
        StatLedger {
            owner,
            values,
            dead: false,
        }
    }

    /// Entity that owns this ledger
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Current value of a stat
    pub fn get(&self, key: StatKey) -> f64 {
        self.values.get(&key).copied().unwrap_or(0.0)
    }

    pub fn health(&self) -> f64 {
        self.get(StatKey::Health)
    }

    pub fn max_health(&self) -> f64 {
        self.get(StatKey::MaxHealth)
    }

    pub fn attack(&self) -> f64 {
        self.get(StatKey::Attack)
    }

    /// Health as a fraction of max health (0 when max health is 0)
    pub fn health_ratio(&self) -> f64 {
        let max = self.max_health();
        if max <= 0.0 {
            return 0.0;
        }
        self.health() / max
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Clamp a candidate value for a key against the current ledger
    fn clamp(&self, key: StatKey, value: f64) -> f64 {
        let value = if value.is_finite() { value } else { self.get(key) };
        match key {
            StatKey::Health => value.clamp(0.0, self.max_health()),
            _ => value.max(key.min_value()),
        }
    }

    /// Write a stat, clamping it, and publish a change event on real change
    ///
    /// Returns true when the stored value changed. Health reaching zero on a
    /// living ledger marks it dead and publishes [`CombatEvent::Died`] once.
    pub fn set(&mut self, key: StatKey, value: f64, events: &mut EventBus) -> bool {
        let changed = self.store(key, value, events);
        if changed && matches!(key, StatKey::Health | StatKey::MaxHealth) {
            self.settle_death(None, events);
        }
        changed
    }

    /// `set(key, get(key) + delta)`
    pub fn modify(&mut self, key: StatKey, delta: f64, events: &mut EventBus) -> bool {
        self.set(key, self.get(key) + delta, events)
    }

    /// Clamp and store a value. The write always happens; only the change
    /// notification is subject to approximate equality.
    fn store(&mut self, key: StatKey, value: f64, events: &mut EventBus) -> bool {
        let old = self.get(key);
        let new = self.clamp(key, value);
        if new == old {
            return false;
        }

        self.values.insert(key, new);
        if !approx_eq(old, new) {
            events.publish(CombatEvent::StatChanged {
                entity: self.owner,
                key,
                old,
                new,
            });
        }

        // Lowering the cap re-clamps health through the same path
        if key == StatKey::MaxHealth && self.health() > new {
            self.store(StatKey::Health, new, events);
        }
        true
    }

    fn settle_death(&mut self, killer: Option<EntityId>, events: &mut EventBus) {
        if self.dead || self.health() > 0.0 {
            return;
        }
        self.values.insert(StatKey::Health, 0.0);
        self.dead = true;
        events.publish(CombatEvent::Died {
            entity: self.owner,
            killer,
        });
    }

    /// Subtract health, returning the amount actually removed
    ///
    /// No-op returning 0 when the entity is dead, `amount <= 0`, or nothing
    /// was left to remove. Damage is clamped to the remaining health, and the
    /// death event fires exactly once.
    pub fn apply_damage(
        &mut self,
        amount: f64,
        attacker: Option<EntityId>,
        events: &mut EventBus,
    ) -> f64 {
        if self.dead || !(amount > 0.0) {
            return 0.0;
        }

        let before = self.health();
        self.store(StatKey::Health, before - amount.min(before), events);
        let applied = before - self.health();
        if !(applied > 0.0) {
            return 0.0;
        }

        events.publish(CombatEvent::DamageTaken {
            entity: self.owner,
            attacker,
            amount: applied,
        });
        self.settle_death(attacker, events);
        applied
    }

    /// Restore health up to max, returning the amount actually healed
    pub fn heal(&mut self, amount: f64, events: &mut EventBus) -> f64 {
        if self.dead || !(amount > 0.0) {
            return 0.0;
        }
        let before = self.health();
        self.store(StatKey::Health, before + amount, events);
        self.health() - before
    }

    /// Bring a dead entity back with the given health
    ///
    /// Returns false, leaving the ledger untouched, when the clamped health
    /// would be zero.
    pub fn revive(&mut self, health: f64, events: &mut EventBus) -> bool {
        if !(self.clamp(StatKey::Health, health) > 0.0) {
            return false;
        }
        self.dead = false;
        self.store(StatKey::Health, health, events);
        true
    }
}
