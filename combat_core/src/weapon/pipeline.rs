//! Weapon stat pipeline - Fold ordered modifiers over a base snapshot

use super::{WeaponModifier, WeaponStats};
use serde::{Deserialize, Serialize};

/// Evaluate modifiers over `base` in ascending priority order
///
/// The sort is stable, so modifiers with equal priority keep their slice order.
/// A modifier whose condition fails against the snapshot at its turn is
/// skipped for this evaluation only.
pub fn evaluate(base: &WeaponStats, modifiers: &[WeaponModifier]) -> WeaponStats {
    let mut ordered: Vec<&WeaponModifier> = modifiers.iter().collect();
    ordered.sort_by_key(|m| m.priority);

    ordered
        .into_iter()
        .fold(*base, |stats, modifier| modifier.apply(&stats))
}

/// One step of a traced evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierStep {
    pub modifier_id: String,
    pub applied: bool,
    pub result: WeaponStats,
}

/// Ordered set of modifiers owned by a weapon
///
/// Kept sorted by ascending priority; insertion among equal priorities is
/// after the existing ones. Deserialized chains go through the same insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<WeaponModifier>", into = "Vec<WeaponModifier>")]
pub struct ModifierChain {
    modifiers: Vec<WeaponModifier>,
}

impl From<Vec<WeaponModifier>> for ModifierChain {
    fn from(modifiers: Vec<WeaponModifier>) -> Self {
        ModifierChain::from_modifiers(modifiers)
    }
}

impl From<ModifierChain> for Vec<WeaponModifier> {
    fn from(chain: ModifierChain) -> Self {
        chain.modifiers
    }
}

impl ModifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from modifiers in any order
    pub fn from_modifiers(modifiers: impl IntoIterator<Item = WeaponModifier>) -> Self {
        let mut chain = Self::new();
        for modifier in modifiers {
            chain.add(modifier);
        }
        chain
    }

    /// Insert a modifier at its priority position
    pub fn add(&mut self, modifier: WeaponModifier) {
        let index = self
            .modifiers
            .partition_point(|m| m.priority <= modifier.priority);
        self.modifiers.insert(index, modifier);
    }

    /// Remove the first modifier with the given id
    pub fn remove(&mut self, id: &str) -> Option<WeaponModifier> {
        let index = self.modifiers.iter().position(|m| m.id == id)?;
        Some(self.modifiers.remove(index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modifiers.iter().any(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Modifiers in application order
    pub fn iter(&self) -> impl Iterator<Item = &WeaponModifier> {
        self.modifiers.iter()
    }

    /// Fold the chain over a base snapshot
    pub fn evaluate(&self, base: &WeaponStats) -> WeaponStats {
        self.modifiers
            .iter()
            .fold(*base, |stats, modifier| modifier.apply(&stats))
    }

    /// Evaluate and record which modifiers applied at each step
    pub fn trace(&self, base: &WeaponStats) -> Vec<ModifierStep> {
        let mut stats = *base;
        let mut steps = Vec::with_capacity(self.modifiers.len());
        for modifier in &self.modifiers {
            let applied = modifier.is_valid_for(&stats);
            stats = modifier.apply(&stats);
            steps.push(ModifierStep {
                modifier_id: modifier.id.clone(),
                applied,
                result: stats,
            });
        }
        steps
    }
}
