//! EffectChain - Ordered, mergeable effects on one projectile

use super::effect::{EffectKind, HitOutcome, ProjectileEffect};
use super::ProjectileCore;
use crate::types::EntityId;

/// Combined result of running every hit handler for one hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitResolution {
    /// Some effect let the projectile pass through
    pub pierced: bool,
    /// Some effect requested destruction
    pub destroy: bool,
    /// Handlers invoked before the chain stopped
    pub handlers_run: usize,
}

/// Effects sorted by ascending priority, stable among equals
#[derive(Debug, Clone, Default)]
pub struct EffectChain {
    effects: Vec<ProjectileEffect>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an effect, merging into an existing same-kind instance when the
    /// kind allows it
    ///
    /// Returns true when a new instance was inserted.
    pub fn attach(&mut self, effect: ProjectileEffect, core: &mut ProjectileCore) -> bool {
        for existing in &mut self.effects {
            if effect.try_merge_into(existing, core) {
                return false;
            }
        }

        let mut effect = effect;
        effect.on_attach(core);
        let index = self
            .effects
            .partition_point(|e| e.priority <= effect.priority);
        self.effects.insert(index, effect);
        true
    }

    /// Run hit handlers in priority order, stopping after a destroy request
    pub fn on_hit(&mut self, target: EntityId, core: &mut ProjectileCore) -> HitResolution {
        let mut resolution = HitResolution::default();
        for effect in &mut self.effects {
            resolution.handlers_run += 1;
            match effect.on_hit(target, core) {
                HitOutcome::Continue => {}
                HitOutcome::Pierced => resolution.pierced = true,
                HitOutcome::Destroy => {
                    resolution.destroy = true;
                    break;
                }
            }
        }
        resolution
    }

    pub fn on_update(&mut self, delta: f64, core: &mut ProjectileCore) {
        for effect in &mut self.effects {
            effect.on_update(delta, core);
        }
    }

    pub fn on_destroy(&mut self, core: &mut ProjectileCore) {
        for effect in &mut self.effects {
            effect.on_destroy(core);
        }
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effects in execution order
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileEffect> {
        self.effects.iter()
    }

    pub fn count_of(&self, kind: EffectKind) -> usize {
        self.effects.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn find(&self, kind: EffectKind) -> Option<&ProjectileEffect> {
        self.effects.iter().find(|e| e.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projectile::effect::EffectBehavior;
    use crate::projectile::ProjectileState;
    use crate::types::{ProjectileId, TeamId};
    use glam::DVec3;

    fn core() -> ProjectileCore {
        ProjectileCore::new(ProjectileState {
            id: ProjectileId(7),
            owner: EntityId(1),
            team: TeamId(0),
            damage: 10.0,
            position: DVec3::ZERO,
            velocity: DVec3::X,
            lifetime_remaining: 1.0,
            homing_target: None,
            hits: 0,
        })
    }

    #[test]
    fn test_pierce_merges_into_single_instance() {
        let mut core = core();
        let mut chain = EffectChain::new();
        assert!(chain.attach(ProjectileEffect::pierce(3), &mut core));
        assert!(!chain.attach(ProjectileEffect::pierce(2), &mut core));

        assert_eq!(chain.count_of(EffectKind::Pierce), 1);
        assert_eq!(
            chain.find(EffectKind::Pierce).map(|e| &e.behavior),
            Some(&EffectBehavior::Pierce { remaining: 5 })
        );
    }

    #[test]
    fn test_homing_appends_second_instance() {
        let mut core = core();
        let mut chain = EffectChain::new();
        chain.attach(ProjectileEffect::homing(30.0), &mut core);
        assert!(chain.attach(ProjectileEffect::homing(30.0), &mut core));
        assert_eq!(chain.count_of(EffectKind::Homing), 2);
    }

    #[test]
    fn test_sorted_by_priority() {
        let mut core = core();
        let mut chain = EffectChain::new();
        chain.attach(ProjectileEffect::homing(10.0).with_priority(5), &mut core);
        chain.attach(ProjectileEffect::split(2, 20.0).with_priority(-1), &mut core);
        chain.attach(ProjectileEffect::pierce(1).with_priority(5), &mut core);

        let kinds: Vec<EffectKind> = chain.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![EffectKind::Split, EffectKind::Homing, EffectKind::Pierce]
        );
    }

    #[test]
    fn test_destroy_stops_later_handlers_for_that_hit() {
        let mut core = core();
        let mut chain = EffectChain::new();
        chain.attach(ProjectileEffect::pierce(0).with_priority(0), &mut core);
        chain.attach(ProjectileEffect::split(2, 20.0).with_priority(1), &mut core);

        let resolution = chain.on_hit(EntityId(2), &mut core);
        assert!(resolution.destroy);
        assert_eq!(resolution.handlers_run, 1);
        assert!(core.splits.is_empty());
    }

    #[test]
    fn test_destroy_does_not_cancel_other_hits() {
        let mut core = core();
        let mut chain = EffectChain::new();
        chain.attach(ProjectileEffect::pierce(1).with_priority(0), &mut core);
        chain.attach(ProjectileEffect::split(2, 20.0).with_priority(1), &mut core);

        let first = chain.on_hit(EntityId(2), &mut core);
        assert!(first.pierced && !first.destroy);
        assert_eq!(first.handlers_run, 2);
        assert_eq!(core.splits.len(), 1);

        let second = chain.on_hit(EntityId(3), &mut core);
        assert!(second.destroy);
        assert_eq!(second.handlers_run, 1);
    }

    #[test]
    fn test_destroy_unsubscribes_hooks() {
        let mut core = core();
        let mut chain = EffectChain::new();
        chain.attach(ProjectileEffect::pierce_damage_multiplier(0.8), &mut core);
        assert_eq!(core.hooks.len(), 1);
        chain.on_destroy(&mut core);
        assert!(core.hooks.is_empty());
    }
}
