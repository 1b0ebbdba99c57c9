//! WeaponStats - Immutable weapon stat snapshot

use serde::{Deserialize, Serialize};

/// Weapon stats at one instant
///
/// Snapshots are never mutated in place; every derived value is a new
/// snapshot built from a base and a set of multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Shots per second
    pub fire_rate: f64,
    /// Base damage per projectile
    pub damage: f64,
    /// Projectile speed in units per second
    pub projectile_speed: f64,
    /// Seconds before an unimpeded projectile is destroyed
    pub projectile_lifetime: f64,
    /// Accuracy rating in `[0, 100]`
    pub accuracy: f64,
    /// Recoil added per shot, before the recoil model's own scaling
    pub recoil: f64,
}

impl Default for WeaponStats {
    fn default() -> Self {
        WeaponStats {
            fire_rate: 5.0,
            damage: 10.0,
            projectile_speed: 40.0,
            projectile_lifetime: 2.0,
            accuracy: 90.0,
            recoil: 1.0,
        }
    }
}

impl WeaponStats {
    /// New snapshot with the four effect-modifiable fields scaled
    ///
    /// Projectile speed and lifetime are fixed at definition time and pass
    /// through unchanged.
    pub fn scaled(&self, fire_rate: f64, damage: f64, accuracy: f64, recoil: f64) -> Self {
        WeaponStats {
            fire_rate: self.fire_rate * fire_rate,
            damage: self.damage * damage,
            accuracy: self.accuracy * accuracy,
            recoil: self.recoil * recoil,
            ..*self
        }
    }

    /// Seconds between shots (infinite when the fire rate is not positive)
    pub fn fire_interval(&self) -> f64 {
        if self.fire_rate <= 0.0 {
            return f64::INFINITY;
        }
        1.0 / self.fire_rate
    }

    /// Distance a projectile covers over its full lifetime
    pub fn max_range(&self) -> f64 {
        self.projectile_speed * self.projectile_lifetime
    }
}
