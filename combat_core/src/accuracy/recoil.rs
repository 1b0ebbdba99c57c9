//! RecoilState - Accumulated recoil with linear recovery

use serde::{Deserialize, Serialize};

/// Recoil accumulator; every transition returns a new value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoilState {
    pub current: f64,
    pub max: f64,
    /// Units recovered per second
    pub recovery_rate: f64,
}

impl RecoilState {
    pub fn new(max: f64, recovery_rate: f64) -> Self {
        RecoilState {
            current: 0.0,
            max: max.max(0.0),
            recovery_rate: recovery_rate.max(0.0),
        }
    }

    /// Add `amount` scaled by the weapon's recoil stat, clamped to `[0, max]`
    pub fn add_recoil(self, amount: f64, weapon_recoil: f64) -> Self {
        let added = amount * weapon_recoil;
        let added = if added.is_finite() { added } else { 0.0 };
        RecoilState {
            current: (self.current + added).clamp(0.0, self.max),
            ..self
        }
    }

    /// Decay toward zero at `recovery_rate` per second
    pub fn update_recovery(self, delta: f64) -> Self {
        let decay = (self.recovery_rate * delta).max(0.0);
        RecoilState {
            current: (self.current - decay).clamp(0.0, self.max),
            ..self
        }
    }

    /// `current / max`, 0 when max is 0
    pub fn ratio(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    pub fn is_settled(&self) -> bool {
        self.current <= 0.0
    }
}

impl Default for RecoilState {
    fn default() -> Self {
        Self::new(10.0, 5.0)
    }
}
