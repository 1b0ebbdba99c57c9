//! Projectiles and their effect chains

mod chain;
pub mod effect;
mod hooks;

pub use chain::{EffectChain, HitResolution};
pub use effect::{EffectBehavior, EffectKind, HitOutcome, MergePolicy, ProjectileEffect, MAX_SPLIT_COUNT};
pub use hooks::{AfterHit, HitHooks, HookId};

use crate::accuracy::spread::orthonormal_basis;
use crate::types::{EntityId, ProjectileId, TeamId, TIME_EPSILON};
use crate::weapon::Shot;
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Mutable flight state visible to effects and hooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    pub id: ProjectileId,
    pub owner: EntityId,
    pub team: TeamId,
    pub damage: f64,
    pub position: DVec3,
    pub velocity: DVec3,
    pub lifetime_remaining: f64,
    /// Point homing effects steer toward, set by the targeting layer
    pub homing_target: Option<DVec3>,
    /// Hits resolved so far
    pub hits: u32,
}

/// Everything an effect handler may touch
#[derive(Debug)]
pub struct ProjectileCore {
    pub state: ProjectileState,
    pub hooks: HitHooks,
    /// Child spawns requested by split effects, taken by the spawning layer
    pub splits: Vec<SplitRequest>,
}

impl ProjectileCore {
    pub fn new(state: ProjectileState) -> Self {
        ProjectileCore {
            state,
            hooks: HitHooks::default(),
            splits: Vec::new(),
        }
    }
}

/// Request for child projectiles produced by a split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRequest {
    pub parent: ProjectileId,
    pub owner: EntityId,
    pub team: TeamId,
    /// Entity struck when the split fired; children should ignore it
    pub hit_target: EntityId,
    pub origin: DVec3,
    pub direction: DVec3,
    pub speed: f64,
    pub damage: f64,
    pub count: u32,
    /// Full fan angle in degrees
    pub spread_angle: f64,
}

impl SplitRequest {
    /// Child directions fanned evenly across the spread angle
    ///
    /// The fan rotates around the local up axis of the parent direction. A
    /// single child continues straight ahead.
    pub fn child_directions(&self) -> Vec<DVec3> {
        let Some(forward) = self.direction.try_normalize() else {
            return Vec::new();
        };
        match self.count {
            0 => Vec::new(),
            1 => vec![forward],
            n => {
                let (_, up) = orthonormal_basis(forward);
                let spread = self.spread_angle.to_radians();
                let step = spread / (n - 1) as f64;
                (0..n)
                    .map(|i| {
                        let angle = -spread * 0.5 + step * i as f64;
                        (DQuat::from_axis_angle(up, angle) * forward).normalize()
                    })
                    .collect()
            }
        }
    }
}

/// Outcome of one hit, handed to damage resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    pub projectile: ProjectileId,
    pub owner: EntityId,
    pub target: EntityId,
    /// Damage carried into this hit (before after-hit hooks ran)
    pub damage: f64,
    pub pierced: bool,
    pub destroyed: bool,
}

/// An in-flight projectile
///
/// Projectiles without a pierce effect are destroyed on their first hit.
/// Destruction runs every effect's teardown exactly once.
#[derive(Debug)]
pub struct Projectile {
    core: ProjectileCore,
    chain: EffectChain,
    destroyed: bool,
}

impl Projectile {
    pub fn new(state: ProjectileState) -> Self {
        Projectile {
            core: ProjectileCore::new(state),
            chain: EffectChain::new(),
            destroyed: false,
        }
    }

    /// Spawn from a weapon shot, attaching the shot's template effects
    pub fn from_shot(id: ProjectileId, owner: EntityId, team: TeamId, shot: &Shot) -> Self {
        let mut projectile = Projectile::new(ProjectileState {
            id,
            owner,
            team,
            damage: shot.damage,
            position: shot.origin,
            velocity: shot.direction * shot.speed,
            lifetime_remaining: shot.lifetime,
            homing_target: None,
            hits: 0,
        });
        for effect in &shot.effects {
            projectile.attach(effect.clone());
        }
        projectile
    }

    /// Spawn the children described by a split request
    pub fn children_of(request: &SplitRequest, first_id: u64, lifetime: f64) -> Vec<Projectile> {
        request
            .child_directions()
            .into_iter()
            .enumerate()
            .map(|(i, direction)| {
                Projectile::new(ProjectileState {
                    id: ProjectileId(first_id + i as u64),
                    owner: request.owner,
                    team: request.team,
                    damage: request.damage,
                    position: request.origin,
                    velocity: direction * request.speed,
                    lifetime_remaining: lifetime,
                    homing_target: None,
                    hits: 0,
                })
            })
            .collect()
    }

    pub fn id(&self) -> ProjectileId {
        self.core.state.id
    }

    pub fn owner(&self) -> EntityId {
        self.core.state.owner
    }

    pub fn team(&self) -> TeamId {
        self.core.state.team
    }

    pub fn state(&self) -> &ProjectileState {
        &self.core.state
    }

    pub fn effects(&self) -> &EffectChain {
        &self.chain
    }

    /// Registered after-hit hooks
    pub fn hook_count(&self) -> usize {
        self.core.hooks.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn set_homing_target(&mut self, target: Option<DVec3>) {
        self.core.state.homing_target = target;
    }

    /// Attach an effect; returns true if a new instance was inserted
    pub fn attach(&mut self, effect: ProjectileEffect) -> bool {
        if self.destroyed {
            tracing::warn!(projectile = self.core.state.id.0, "attach on destroyed projectile ignored");
            return false;
        }
        self.chain.attach(effect, &mut self.core)
    }

    /// Advance flight: effects first, then integration, then lifetime
    pub fn update(&mut self, delta: f64) {
        if self.destroyed {
            return;
        }
        self.chain.on_update(delta, &mut self.core);
        let state = &mut self.core.state;
        state.position += state.velocity * delta;
        state.lifetime_remaining -= delta;
        if state.lifetime_remaining <= TIME_EPSILON {
            self.destroy();
        }
    }

    /// Resolve a collision with `target`
    pub fn hit(&mut self, target: EntityId) -> Option<HitReport> {
        if self.destroyed {
            return None;
        }

        let damage = self.core.state.damage;
        let resolution = self.chain.on_hit(target, &mut self.core);
        let destroyed = resolution.destroy || !resolution.pierced;
        self.core.state.hits += 1;

        let after = AfterHit {
            target,
            pierced: resolution.pierced && !resolution.destroy,
            destroyed,
        };
        let core = &mut self.core;
        core.hooks.dispatch(&after, &mut core.state);

        if destroyed {
            self.destroy();
        }

        Some(HitReport {
            projectile: self.core.state.id,
            owner: self.core.state.owner,
            target,
            damage,
            pierced: after.pierced,
            destroyed,
        })
    }

    /// Tear down the projectile; later calls are no-ops
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.chain.on_destroy(&mut self.core);
    }

    /// Take pending split requests
    pub fn take_split_requests(&mut self) -> Vec<SplitRequest> {
        std::mem::take(&mut self.core.splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile(damage: f64) -> Projectile {
        Projectile::new(ProjectileState {
            id: ProjectileId(1),
            owner: EntityId(1),
            team: TeamId(0),
            damage,
            position: DVec3::ZERO,
            velocity: DVec3::Z * 20.0,
            lifetime_remaining: 1.0,
            homing_target: None,
            hits: 0,
        })
    }

    #[test]
    fn test_plain_projectile_destroyed_on_first_hit() {
        let mut p = projectile(10.0);
        let report = p.hit(EntityId(2)).unwrap();
        assert!(report.destroyed);
        assert!((report.damage - 10.0).abs() < f64::EPSILON);
        assert!(p.is_destroyed());
        assert!(p.hit(EntityId(3)).is_none());
    }

    #[test]
    fn test_pierce_keeps_projectile_alive() {
        let mut p = projectile(10.0);
        p.attach(ProjectileEffect::pierce(2));

        assert!(!p.hit(EntityId(2)).unwrap().destroyed);
        assert!(!p.hit(EntityId(3)).unwrap().destroyed);
        assert!(p.hit(EntityId(4)).unwrap().destroyed);
        assert_eq!(p.state().hits, 3);
    }

    #[test]
    fn test_pierce_damage_falloff() {
        let mut p = projectile(100.0);
        p.attach(ProjectileEffect::pierce(3));
        p.attach(ProjectileEffect::pierce_damage_multiplier(0.5));

        let damages: Vec<f64> = (2..6)
            .filter_map(|t| p.hit(EntityId(t)))
            .map(|r| r.damage)
            .collect();
        assert_eq!(damages, vec![100.0, 50.0, 25.0, 12.5]);
        assert!(p.is_destroyed());
        assert_eq!(p.hook_count(), 0);
    }

    #[test]
    fn test_lifetime_expiry_destroys_once() {
        let mut p = projectile(10.0);
        p.attach(ProjectileEffect::pierce_damage_multiplier(0.9));
        p.update(0.5);
        assert!(!p.is_destroyed());
        assert!((p.state().position.z - 10.0).abs() < 1e-9);

        p.update(0.5);
        assert!(p.is_destroyed());
        assert_eq!(p.hook_count(), 0);

        let position = p.state().position;
        p.update(1.0);
        assert_eq!(p.state().position, position);
    }

    #[test]
    fn test_split_request_children() {
        let mut p = projectile(10.0);
        p.attach(ProjectileEffect::split(3, 30.0));
        p.hit(EntityId(2));

        let requests = p.take_split_requests();
        assert_eq!(requests.len(), 1);
        let dirs = requests[0].child_directions();
        assert_eq!(dirs.len(), 3);
        assert!(dirs[1].angle_between(DVec3::Z) < 1e-9);
        assert!((dirs[0].angle_between(DVec3::Z) - 15f64.to_radians()).abs() < 1e-9);
        assert!((dirs[2].angle_between(DVec3::Z) - 15f64.to_radians()).abs() < 1e-9);

        let children = Projectile::children_of(&requests[0], 100, 0.5);
        assert_eq!(children.len(), 3);
        assert_eq!(children[2].id(), ProjectileId(102));
        assert!((children[0].state().velocity.length() - 20.0).abs() < 1e-9);
        assert!(p.take_split_requests().is_empty());
    }

    #[test]
    fn test_attach_after_destroy_rejected() {
        let mut p = projectile(10.0);
        p.destroy();
        assert!(!p.attach(ProjectileEffect::pierce(1)));
        assert!(p.effects().is_empty());
    }
}
