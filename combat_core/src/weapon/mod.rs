//! Weapons - Stat pipeline, recoil and firing

mod modifier;
mod pipeline;
mod snapshot;

pub use modifier::{ModifierCondition, ModifierPresets, WeaponModifier};
pub use pipeline::{evaluate, ModifierChain, ModifierStep};
pub use snapshot::WeaponStats;

use crate::accuracy::{AccuracyModel, AccuracySettings, FireMode, FireModeTable, RecoilState};
use crate::projectile::ProjectileEffect;
use crate::types::TIME_EPSILON;
use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Designer-authored weapon data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    pub id: String,
    pub name: String,
    pub base: WeaponStats,
    /// Recoil added per shot before weapon/mode scaling
    #[serde(default = "default_recoil_per_shot")]
    pub recoil_per_shot: f64,
    #[serde(default = "default_max_recoil")]
    pub max_recoil: f64,
    #[serde(default = "default_recovery_rate")]
    pub recovery_rate: f64,
    #[serde(default)]
    pub modifiers: Vec<WeaponModifier>,
    /// Effects attached to every projectile this weapon fires
    #[serde(default)]
    pub projectile_effects: Vec<ProjectileEffect>,
}

fn default_recoil_per_shot() -> f64 {
    1.0
}
fn default_max_recoil() -> f64 {
    10.0
}
fn default_recovery_rate() -> f64 {
    5.0
}

impl WeaponDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, base: WeaponStats) -> Self {
        WeaponDefinition {
            id: id.into(),
            name: name.into(),
            base,
            recoil_per_shot: default_recoil_per_shot(),
            max_recoil: default_max_recoil(),
            recovery_rate: default_recovery_rate(),
            modifiers: Vec::new(),
            projectile_effects: Vec::new(),
        }
    }
}

/// A fired shot, ready to become a projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    pub origin: DVec3,
    /// Unit direction after spread
    pub direction: DVec3,
    pub speed: f64,
    pub damage: f64,
    pub lifetime: f64,
    pub effects: Vec<ProjectileEffect>,
}

/// Weapon stat fields that upgrades may raise or lower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponStat {
    FireRate,
    Damage,
    Accuracy,
    Recoil,
}

/// A weapon instance: mutable base, modifier chain, recoil model, cooldown
///
/// `tick` advances the cooldown and runs the two-step accuracy contract:
/// recoil recovery, then recompute from the freshly evaluated snapshot.
#[derive(Debug, Clone)]
pub struct Weapon {
    id: String,
    name: String,
    base: WeaponStats,
    modifiers: ModifierChain,
    accuracy: AccuracyModel,
    recoil_per_shot: f64,
    projectile_effects: Vec<ProjectileEffect>,
    cooldown: f64,
    stats: WeaponStats,
    shots_fired: u64,
}

impl Weapon {
    pub fn new(definition: &WeaponDefinition, settings: AccuracySettings, modes: FireModeTable) -> Self {
        let recoil = RecoilState::new(definition.max_recoil, definition.recovery_rate);
        let mut weapon = Weapon {
            id: definition.id.clone(),
            name: definition.name.clone(),
            base: definition.base,
            modifiers: ModifierChain::from_modifiers(definition.modifiers.iter().cloned()),
            accuracy: AccuracyModel::new(recoil, settings, modes),
            recoil_per_shot: definition.recoil_per_shot,
            projectile_effects: definition.projectile_effects.clone(),
            cooldown: 0.0,
            stats: definition.base,
            shots_fired: 0,
        };
        weapon.refresh();
        weapon
    }

    /// Weapon with default accuracy tunables
    pub fn from_definition(definition: &WeaponDefinition) -> Self {
        Self::new(definition, AccuracySettings::default(), FireModeTable::default())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base snapshot before modifiers
    pub fn base_stats(&self) -> WeaponStats {
        self.base
    }

    /// Snapshot after modifiers, as of the last refresh
    pub fn current_stats(&self) -> WeaponStats {
        self.stats
    }

    pub fn current_accuracy(&self) -> f64 {
        self.accuracy.accuracy()
    }

    pub fn current_spread(&self) -> f64 {
        self.accuracy.spread()
    }

    pub fn recoil_ratio(&self) -> f64 {
        self.accuracy.recoil_ratio()
    }

    pub fn kick_angle(&self) -> f64 {
        self.accuracy.kick_angle()
    }

    pub fn recoil(&self) -> RecoilState {
        self.accuracy.recoil()
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }

    pub fn shots_fired(&self) -> u64 {
        self.shots_fired
    }

    pub fn modifiers(&self) -> &ModifierChain {
        &self.modifiers
    }

    pub fn mode(&self) -> FireMode {
        self.accuracy.mode()
    }

    pub fn set_mode(&mut self, mode: FireMode) {
        self.accuracy.set_mode(mode);
        self.refresh();
    }

    pub fn add_modifier(&mut self, modifier: WeaponModifier) {
        self.modifiers.add(modifier);
        self.refresh();
    }

    pub fn remove_modifier(&mut self, id: &str) -> Option<WeaponModifier> {
        let removed = self.modifiers.remove(id);
        if removed.is_some() {
            self.refresh();
        }
        removed
    }

    /// Attach an extra effect template to future projectiles
    pub fn add_projectile_effect(&mut self, effect: ProjectileEffect) {
        self.projectile_effects.push(effect);
    }

    /// Re-evaluate the snapshot and the cached accuracy/spread
    fn refresh(&mut self) {
        self.stats = self.modifiers.evaluate(&self.base);
        self.accuracy.recompute(self.stats.accuracy);
    }

    pub fn can_fire(&self) -> bool {
        self.cooldown <= TIME_EPSILON && self.stats.fire_rate > 0.0
    }

    /// Advance the cooldown, recover recoil, then recompute
    pub fn tick(&mut self, delta: f64) {
        self.cooldown = (self.cooldown - delta).max(0.0);
        self.accuracy.recover(delta);
        self.refresh();
    }

    /// Fire if the cooldown allows, perturbing `aim` by the current spread
    ///
    /// Returns `None` while cooling down or when `aim` has no direction.
    pub fn try_fire(&mut self, origin: DVec3, aim: DVec3, rng: &mut impl Rng) -> Option<Shot> {
        if !self.can_fire() {
            return None;
        }
        if aim.try_normalize().is_none() {
            tracing::warn!(weapon = %self.id, "fire request with zero-length aim ignored");
            return None;
        }

        let direction = self.accuracy.perturb(aim, rng);
        let shot = Shot {
            origin,
            direction,
            speed: self.stats.projectile_speed,
            damage: self.stats.damage,
            lifetime: self.stats.projectile_lifetime,
            effects: self.projectile_effects.clone(),
        };

        self.accuracy.add_recoil(self.recoil_per_shot, self.stats.recoil);
        self.cooldown = self.stats.fire_interval();
        self.shots_fired += 1;
        self.refresh();
        Some(shot)
    }

    /// Raise a base stat additively (upgrade application)
    pub fn adjust_base(&mut self, stat: WeaponStat, delta: f64) {
        let base = self.base;
        self.base = match stat {
            WeaponStat::FireRate => WeaponStats {
                fire_rate: base.fire_rate + delta,
                ..base
            },
            WeaponStat::Damage => WeaponStats {
                damage: base.damage + delta,
                ..base
            },
            WeaponStat::Accuracy => WeaponStats {
                accuracy: base.accuracy + delta,
                ..base
            },
            WeaponStat::Recoil => WeaponStats {
                recoil: base.recoil + delta,
                ..base
            },
        };
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rifle() -> Weapon {
        let definition = WeaponDefinition::new(
            "rifle",
            "Rifle",
            WeaponStats {
                fire_rate: 4.0,
                damage: 10.0,
                projectile_speed: 50.0,
                projectile_lifetime: 1.5,
                accuracy: 80.0,
                recoil: 1.0,
            },
        );
        Weapon::from_definition(&definition)
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut weapon = rifle();

        assert!(weapon.try_fire(DVec3::ZERO, DVec3::Z, &mut rng).is_some());
        assert!(weapon.try_fire(DVec3::ZERO, DVec3::Z, &mut rng).is_none());

        weapon.tick(0.25);
        assert!(weapon.try_fire(DVec3::ZERO, DVec3::Z, &mut rng).is_some());
        assert_eq!(weapon.shots_fired(), 2);
    }

    #[test]
    fn test_firing_adds_recoil_and_lowers_accuracy() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut weapon = rifle();
        let before = weapon.current_accuracy();

        weapon.try_fire(DVec3::ZERO, DVec3::Z, &mut rng);
        assert!(weapon.recoil_ratio() > 0.0);
        assert!(weapon.current_accuracy() < before);
        assert!(weapon.current_spread() > 0.0);

        // 1 recoil at 5/s recovery is gone after 0.2s
        weapon.tick(0.2);
        assert!((weapon.current_accuracy() - before).abs() < 1e-9);
    }

    #[test]
    fn test_shot_carries_snapshot() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut weapon = rifle();
        weapon.add_modifier(WeaponModifier::new("double", 0).with_damage(2.0));
        weapon.add_projectile_effect(ProjectileEffect::pierce(1));

        let shot = weapon.try_fire(DVec3::ZERO, DVec3::Z, &mut rng).unwrap();
        assert!((shot.damage - 20.0).abs() < 1e-9);
        assert!((shot.speed - 50.0).abs() < 1e-9);
        assert!((shot.direction.length() - 1.0).abs() < 1e-9);
        assert_eq!(shot.effects.len(), 1);
    }

    #[test]
    fn test_zero_aim_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut weapon = rifle();
        assert!(weapon.try_fire(DVec3::ZERO, DVec3::ZERO, &mut rng).is_none());
        assert_eq!(weapon.shots_fired(), 0);
    }

    #[test]
    fn test_adjust_base_round_trip() {
        let mut weapon = rifle();
        weapon.add_modifier(WeaponModifier::new("half", 0).with_damage(0.5));
        weapon.adjust_base(WeaponStat::Damage, 6.0);
        assert!((weapon.current_stats().damage - 8.0).abs() < 1e-9);
        weapon.adjust_base(WeaponStat::Damage, -6.0);
        assert!((weapon.current_stats().damage - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_aimed_mode_tightens_spread() {
        let mut weapon = rifle();
        let hip = weapon.current_spread();
        weapon.set_mode(FireMode::Aimed);
        assert!(weapon.current_spread() < hip);
    }

    #[test]
    fn test_definition_from_toml() {
        let toml = r#"
id = "smg"
name = "SMG"
recoil_per_shot = 0.5

[base]
fire_rate = 12.0
damage = 4.0
projectile_speed = 45.0
projectile_lifetime = 1.0
accuracy = 65.0
recoil = 0.8

[[modifiers]]
id = "extended_barrel"
priority = 1
accuracy_mul = 1.1

[[projectile_effects]]
kind = "pierce"
remaining = 1
"#;
        let definition: WeaponDefinition = toml::from_str(toml).unwrap();
        assert_eq!(definition.modifiers.len(), 1);
        assert_eq!(definition.projectile_effects.len(), 1);
        assert!((definition.max_recoil - 10.0).abs() < f64::EPSILON);

        let weapon = Weapon::from_definition(&definition);
        assert!((weapon.current_stats().accuracy - 71.5).abs() < 1e-9);
    }
}
