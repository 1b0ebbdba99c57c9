//! Combatant - An entity with a ledger, an invulnerability gate and a weapon

use super::{CombatParticipant, DamageAcceptor};
use crate::events::{CombatEvent, EventBus};
use crate::ledger::{BaseStats, InvulnerabilityWindow, StatLedger};
use crate::types::{EntityId, StatKey, TeamId};
use crate::upgrade::{Upgradable, UpgradeType};
use crate::weapon::Weapon;

/// A combat entity
///
/// Damage passes through the invulnerability gate before reaching the ledger.
/// Any hit that removes health opens the gate for the default duration.
#[derive(Debug, Clone)]
pub struct Combatant {
    id: EntityId,
    team: TeamId,
    ledger: StatLedger,
    invulnerability: InvulnerabilityWindow,
    weapon: Option<Weapon>,
}

impl Combatant {
    pub fn new(id: EntityId, team: TeamId, base: BaseStats, invulnerability_duration: f64) -> Self {
        Combatant {
            id,
            team,
            ledger: StatLedger::new(id, base),
            invulnerability: InvulnerabilityWindow::new(invulnerability_duration),
            weapon: None,
        }
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn ledger(&self) -> &StatLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut StatLedger {
        &mut self.ledger
    }

    pub fn invulnerability(&self) -> &InvulnerabilityWindow {
        &self.invulnerability
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    pub fn weapon_mut(&mut self) -> Option<&mut Weapon> {
        self.weapon.as_mut()
    }

    pub fn equip(&mut self, weapon: Weapon) -> Option<Weapon> {
        self.weapon.replace(weapon)
    }

    /// Open the invulnerability window for `duration`, overriding any countdown
    pub fn make_invulnerable(&mut self, duration: f64, events: &mut EventBus) -> bool {
        if !self.invulnerability.trigger(duration) {
            tracing::warn!(entity = %self.id, duration, "ignored invulnerability trigger");
            return false;
        }
        events.publish(CombatEvent::InvulnerabilityStarted {
            entity: self.id,
            duration,
        });
        tracing::debug!(entity = %self.id, duration, "invulnerable");
        true
    }

    pub fn tick_invulnerability(&mut self, delta: f64, events: &mut EventBus) {
        if self.invulnerability.tick(delta) {
            events.publish(CombatEvent::InvulnerabilityEnded { entity: self.id });
            tracing::debug!(entity = %self.id, "vulnerable");
        }
    }

    pub fn tick_weapon(&mut self, delta: f64) {
        if let Some(weapon) = self.weapon.as_mut() {
            weapon.tick(delta);
        }
    }
}

impl CombatParticipant for Combatant {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn team(&self) -> TeamId {
        self.team
    }

    fn is_alive(&self) -> bool {
        self.ledger.is_alive()
    }

    fn attack(&self) -> f64 {
        self.ledger.attack()
    }

    fn health(&self) -> f64 {
        self.ledger.health()
    }
}

impl DamageAcceptor for Combatant {
    fn accept_damage(&mut self, amount: f64, attacker: Option<EntityId>, events: &mut EventBus) -> f64 {
        if self.invulnerability.is_active() {
            tracing::debug!(entity = %self.id, amount, "damage blocked by invulnerability");
            return 0.0;
        }

        let applied = self.ledger.apply_damage(amount, attacker, events);
        if applied > 0.0 {
            let duration = self.invulnerability.default_duration;
            if self.invulnerability.trigger(duration) {
                events.publish(CombatEvent::InvulnerabilityStarted {
                    entity: self.id,
                    duration,
                });
            }
        }
        applied
    }
}

impl Upgradable for Combatant {
    fn can_receive(&self, upgrade: UpgradeType) -> bool {
        upgrade.stat_key().is_some() || (upgrade.weapon_stat().is_some() && self.weapon.is_some())
    }

    /// Max health upgrades also restore the added health
    fn apply_upgrade(&mut self, upgrade: UpgradeType, value: f64, events: &mut EventBus) -> Option<f64> {
        if let Some(key) = upgrade.stat_key() {
            let before = self.ledger.get(key);
            self.ledger.modify(key, value, events);
            let delta = self.ledger.get(key) - before;
            if key == StatKey::MaxHealth && delta > 0.0 {
                self.ledger.heal(delta, events);
            }
            return Some(delta);
        }
        match (upgrade.weapon_stat(), self.weapon.as_mut()) {
            (Some(stat), Some(weapon)) => {
                weapon.adjust_base(stat, value);
                Some(value)
            }
            _ => None,
        }
    }

    fn remove_upgrade(&mut self, upgrade: UpgradeType, value: f64, events: &mut EventBus) -> bool {
        if let Some(key) = upgrade.stat_key() {
            self.ledger.modify(key, -value, events);
            return true;
        }
        match (upgrade.weapon_stat(), self.weapon.as_mut()) {
            (Some(stat), Some(weapon)) => {
                weapon.adjust_base(stat, -value);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InvulnerabilityState;
    use crate::weapon::{WeaponDefinition, WeaponStats};

    fn combatant() -> Combatant {
        Combatant::new(EntityId(1), TeamId(0), BaseStats::default(), 1.0)
    }

    #[test]
    fn test_hit_opens_invulnerability() {
        let mut c = combatant();
        let mut events = EventBus::new();

        assert!((c.accept_damage(10.0, None, &mut events) - 10.0).abs() < f64::EPSILON);
        assert_eq!(c.invulnerability().state(), InvulnerabilityState::Invulnerable);
        assert_eq!(c.accept_damage(10.0, None, &mut events), 0.0);
        assert!((c.ledger().health() - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invulnerability_boundary() {
        let mut c = combatant();
        let mut events = EventBus::new();
        c.accept_damage(10.0, None, &mut events);

        c.tick_invulnerability(1.0 - 1e-3, &mut events);
        assert!(c.invulnerability().is_active());
        c.tick_invulnerability(1e-3, &mut events);
        assert!(!c.invulnerability().is_active());

        let ended = events
            .drain()
            .into_iter()
            .filter(|e| matches!(e, CombatEvent::InvulnerabilityEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_manual_trigger_overrides() {
        let mut c = combatant();
        let mut events = EventBus::new();
        c.accept_damage(10.0, None, &mut events);
        assert!(c.make_invulnerable(3.0, &mut events));
        assert!((c.invulnerability().remaining() - 3.0).abs() < f64::EPSILON);
        assert!(!c.make_invulnerable(0.0, &mut events));
    }

    #[test]
    fn test_zero_default_disables_auto_trigger() {
        let mut c = Combatant::new(EntityId(1), TeamId(0), BaseStats::default(), 0.0);
        let mut events = EventBus::new();
        c.accept_damage(10.0, None, &mut events);
        assert!(!c.invulnerability().is_active());
        assert!((c.accept_damage(10.0, None, &mut events) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stat_upgrades() {
        let mut c = combatant();
        let mut events = EventBus::new();

        assert_eq!(c.apply_upgrade(UpgradeType::MaxHealth, 50.0, &mut events), Some(50.0));
        assert!((c.ledger().max_health() - 150.0).abs() < f64::EPSILON);
        assert!((c.ledger().health() - 150.0).abs() < f64::EPSILON);

        assert!(c.remove_upgrade(UpgradeType::MaxHealth, 50.0, &mut events));
        assert!((c.ledger().max_health() - 100.0).abs() < f64::EPSILON);
        assert!((c.ledger().health() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamped_upgrade_reports_actual_change() {
        let mut c = Combatant::new(
            EntityId(1),
            TeamId(0),
            BaseStats {
                attack: 2.0,
                ..BaseStats::default()
            },
            1.0,
        );
        let mut events = EventBus::new();

        assert_eq!(c.apply_upgrade(UpgradeType::Attack, -5.0, &mut events), Some(-2.0));
        assert_eq!(c.ledger().attack(), 0.0);
        assert!(c.remove_upgrade(UpgradeType::Attack, -2.0, &mut events));
        assert!((c.ledger().attack() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weapon_upgrades_need_weapon() {
        let mut c = combatant();
        let mut events = EventBus::new();
        assert!(!c.can_receive(UpgradeType::WeaponDamage));
        assert!(c.apply_upgrade(UpgradeType::WeaponDamage, 5.0, &mut events).is_none());

        let def = WeaponDefinition::new("pistol", "Pistol", WeaponStats::default());
        c.equip(Weapon::from_definition(&def));
        assert!(c.can_receive(UpgradeType::WeaponDamage));
        assert_eq!(c.apply_upgrade(UpgradeType::WeaponDamage, 5.0, &mut events), Some(5.0));
        let damage = c.weapon().map(|w| w.current_stats().damage);
        assert_eq!(damage, Some(15.0));
    }
}
