//! Accuracy / recoil model

mod recoil;
pub mod spread;

pub use recoil::RecoilState;
pub use spread::{compute_accuracy, sample_direction, spread_angle};

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tunables for the accuracy and spread calculations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracySettings {
    /// Fraction of base accuracy lost at full recoil
    #[serde(default = "default_recoil_penalty")]
    pub recoil_penalty: f64,
    /// Full cone angle in degrees at zero accuracy
    #[serde(default = "default_max_spread_angle")]
    pub max_spread_angle: f64,
    /// Sampling exponent reached at 100 accuracy
    #[serde(default = "default_center_weight")]
    pub center_weight_multiplier: f64,
    /// Visual kick in degrees at full recoil
    #[serde(default = "default_kick_angle")]
    pub max_kick_angle: f64,
}

fn default_recoil_penalty() -> f64 {
    0.5
}
fn default_max_spread_angle() -> f64 {
    15.0
}
fn default_center_weight() -> f64 {
    3.0
}
fn default_kick_angle() -> f64 {
    4.0
}

impl Default for AccuracySettings {
    fn default() -> Self {
        AccuracySettings {
            recoil_penalty: default_recoil_penalty(),
            max_spread_angle: default_max_spread_angle(),
            center_weight_multiplier: default_center_weight(),
            max_kick_angle: default_kick_angle(),
        }
    }
}

/// Firing stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireMode {
    Hip,
    Aimed,
}

/// Multipliers a fire mode contributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireModeModifiers {
    pub accuracy_multiplier: f64,
    pub recoil_multiplier: f64,
}

impl Default for FireModeModifiers {
    fn default() -> Self {
        FireModeModifiers {
            accuracy_multiplier: 1.0,
            recoil_multiplier: 1.0,
        }
    }
}

/// Per-mode multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireModeTable {
    #[serde(default)]
    pub hip: FireModeModifiers,
    #[serde(default = "default_aimed")]
    pub aimed: FireModeModifiers,
}

fn default_aimed() -> FireModeModifiers {
    FireModeModifiers {
        accuracy_multiplier: 1.25,
        recoil_multiplier: 0.7,
    }
}

impl Default for FireModeTable {
    fn default() -> Self {
        FireModeTable {
            hip: FireModeModifiers::default(),
            aimed: default_aimed(),
        }
    }
}

impl FireModeTable {
    pub fn get(&self, mode: FireMode) -> FireModeModifiers {
        match mode {
            FireMode::Hip => self.hip,
            FireMode::Aimed => self.aimed,
        }
    }
}

/// Recoil state plus cached accuracy and spread for one weapon
///
/// Per-tick use is a two-step contract: [`AccuracyModel::recover`] first,
/// then [`AccuracyModel::recompute`] against the weapon's current snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyModel {
    pub settings: AccuracySettings,
    pub modes: FireModeTable,
    mode: FireMode,
    recoil: RecoilState,
    accuracy: f64,
    spread: f64,
}

impl AccuracyModel {
    pub fn new(recoil: RecoilState, settings: AccuracySettings, modes: FireModeTable) -> Self {
        AccuracyModel {
            settings,
            modes,
            mode: FireMode::Hip,
            recoil,
            accuracy: 0.0,
            spread: settings.max_spread_angle,
        }
    }

    pub fn mode(&self) -> FireMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: FireMode) {
        self.mode = mode;
    }

    pub fn recoil(&self) -> RecoilState {
        self.recoil
    }

    pub fn recoil_ratio(&self) -> f64 {
        self.recoil.ratio()
    }

    /// Visual kick in degrees for the current recoil
    pub fn kick_angle(&self) -> f64 {
        self.recoil.ratio() * self.settings.max_kick_angle
    }

    /// Accuracy as of the last recompute
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Spread cone angle as of the last recompute
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Step one: decay recoil
    pub fn recover(&mut self, delta: f64) {
        self.recoil = self.recoil.update_recovery(delta);
    }

    /// Step two: refresh cached accuracy and spread from a base accuracy
    pub fn recompute(&mut self, base_accuracy: f64) {
        let modifiers = self.modes.get(self.mode);
        self.accuracy = compute_accuracy(base_accuracy, &self.recoil, &modifiers, &self.settings);
        self.spread = spread_angle(self.accuracy, &self.settings);
    }

    /// Record a shot's recoil, scaled by the weapon stat and the fire mode
    pub fn add_recoil(&mut self, amount: f64, weapon_recoil: f64) {
        let scale = weapon_recoil * self.modes.get(self.mode).recoil_multiplier;
        self.recoil = self.recoil.add_recoil(amount, scale);
    }

    /// Perturb an aim direction by the cached spread
    pub fn perturb(&self, aim: DVec3, rng: &mut impl Rng) -> DVec3 {
        sample_direction(aim, self.spread, self.accuracy, &self.settings, rng)
    }
}
