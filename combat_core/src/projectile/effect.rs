//! Projectile effects - Behaviours attached to an in-flight projectile

use super::hooks::HookId;
use super::{ProjectileCore, SplitRequest};
use crate::types::EntityId;
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Most children a single split may spawn
pub const MAX_SPLIT_COUNT: u32 = 32;

/// Effect kinds, used for merge-on-attach lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Pierce,
    Split,
    PierceDamageMultiplier,
    Homing,
}

/// How an incoming effect treats an existing effect of the same kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Fold parameters into the existing instance
    Merge,
    /// Insert a second instance
    Append,
}

impl EffectKind {
    pub fn merge_policy(self) -> MergePolicy {
        match self {
            EffectKind::Pierce | EffectKind::Split | EffectKind::PierceDamageMultiplier => {
                MergePolicy::Merge
            }
            // Turn rates stack
            EffectKind::Homing => MergePolicy::Append,
        }
    }
}

/// Result of a single hit handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// No opinion about the projectile's survival
    Continue,
    /// The projectile passes through this target
    Pierced,
    /// The projectile must be destroyed; later handlers do not run for this hit
    Destroy,
}

/// Effect parameters and per-instance state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectBehavior {
    /// Pass through `remaining` targets; destroy on the hit after that
    Pierce { remaining: u32 },
    /// Request `count` child projectiles across `spread_angle` degrees on the next hit
    Split {
        count: u32,
        spread_angle: f64,
        #[serde(skip)]
        spent: bool,
    },
    /// Scale damage by `multiplier` after every hit the projectile pierces
    PierceDamageMultiplier {
        multiplier: f64,
        #[serde(skip)]
        hook: Option<HookId>,
    },
    /// Turn toward the homing target at `turn_rate` degrees per second
    Homing { turn_rate: f64 },
}

/// An effect with its ordering priority (ascending runs first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileEffect {
    #[serde(default)]
    pub priority: i32,
    #[serde(flatten)]
    pub behavior: EffectBehavior,
}

impl ProjectileEffect {
    pub fn pierce(count: u32) -> Self {
        ProjectileEffect {
            priority: 0,
            behavior: EffectBehavior::Pierce { remaining: count },
        }
    }

    pub fn split(count: u32, spread_angle: f64) -> Self {
        ProjectileEffect {
            priority: 10,
            behavior: EffectBehavior::Split {
                count: count.min(MAX_SPLIT_COUNT),
                spread_angle,
                spent: false,
            },
        }
    }

    pub fn pierce_damage_multiplier(multiplier: f64) -> Self {
        ProjectileEffect {
            priority: 20,
            behavior: EffectBehavior::PierceDamageMultiplier {
                multiplier,
                hook: None,
            },
        }
    }

    pub fn homing(turn_rate: f64) -> Self {
        ProjectileEffect {
            priority: 30,
            behavior: EffectBehavior::Homing { turn_rate },
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn kind(&self) -> EffectKind {
        match self.behavior {
            EffectBehavior::Pierce { .. } => EffectKind::Pierce,
            EffectBehavior::Split { .. } => EffectKind::Split,
            EffectBehavior::PierceDamageMultiplier { .. } => EffectKind::PierceDamageMultiplier,
            EffectBehavior::Homing { .. } => EffectKind::Homing,
        }
    }

    /// Fold this incoming effect into `existing` if the kind merges
    ///
    /// Returns true when the effect was absorbed and must not be inserted.
    pub fn try_merge_into(&self, existing: &mut ProjectileEffect, core: &mut ProjectileCore) -> bool {
        if self.kind() != existing.kind() || self.kind().merge_policy() != MergePolicy::Merge {
            return false;
        }

        match (&self.behavior, &mut existing.behavior) {
            (
                EffectBehavior::Pierce { remaining: incoming },
                EffectBehavior::Pierce { remaining },
            ) => {
                *remaining = remaining.saturating_add(*incoming);
            }
            (
                EffectBehavior::Split {
                    count: incoming,
                    spread_angle: incoming_spread,
                    ..
                },
                EffectBehavior::Split {
                    count,
                    spread_angle,
                    spent,
                },
            ) => {
                *count = count.saturating_add(*incoming).min(MAX_SPLIT_COUNT);
                *spread_angle = spread_angle.max(*incoming_spread);
                *spent = false;
            }
            (
                EffectBehavior::PierceDamageMultiplier {
                    multiplier: incoming,
                    ..
                },
                EffectBehavior::PierceDamageMultiplier { multiplier, hook },
            ) => {
                *multiplier *= incoming;
                // The registered hook captured the old multiplier
                if let Some(old) = hook.take() {
                    core.hooks.unsubscribe(old);
                }
                *hook = Some(subscribe_damage_multiplier(core, *multiplier));
            }
            _ => return false,
        }
        true
    }

    /// Attach handler, run once when the effect is inserted
    pub fn on_attach(&mut self, core: &mut ProjectileCore) {
        if let EffectBehavior::PierceDamageMultiplier { multiplier, hook } = &mut self.behavior {
            if hook.is_none() {
                *hook = Some(subscribe_damage_multiplier(core, *multiplier));
            }
        }
    }

    /// Hit handler
    pub fn on_hit(&mut self, target: EntityId, core: &mut ProjectileCore) -> HitOutcome {
        match &mut self.behavior {
            EffectBehavior::Pierce { remaining } => {
                if *remaining == 0 {
                    HitOutcome::Destroy
                } else {
                    *remaining -= 1;
                    HitOutcome::Pierced
                }
            }
            EffectBehavior::Split {
                count,
                spread_angle,
                spent,
            } => {
                if !*spent && *count > 0 {
                    *spent = true;
                    core.splits.push(SplitRequest {
                        parent: core.state.id,
                        owner: core.state.owner,
                        team: core.state.team,
                        hit_target: target,
                        origin: core.state.position,
                        direction: core.state.velocity.normalize_or_zero(),
                        speed: core.state.velocity.length(),
                        damage: core.state.damage,
                        count: (*count).min(MAX_SPLIT_COUNT),
                        spread_angle: *spread_angle,
                    });
                }
                HitOutcome::Continue
            }
            EffectBehavior::PierceDamageMultiplier { .. } | EffectBehavior::Homing { .. } => {
                HitOutcome::Continue
            }
        }
    }

    /// Per-tick handler
    pub fn on_update(&mut self, delta: f64, core: &mut ProjectileCore) {
        if let EffectBehavior::Homing { turn_rate } = self.behavior {
            steer_toward_target(core, turn_rate, delta);
        }
    }

    /// Teardown handler
    pub fn on_destroy(&mut self, core: &mut ProjectileCore) {
        if let EffectBehavior::PierceDamageMultiplier { hook, .. } = &mut self.behavior {
            if let Some(id) = hook.take() {
                core.hooks.unsubscribe(id);
            }
        }
    }
}

fn subscribe_damage_multiplier(core: &mut ProjectileCore, multiplier: f64) -> HookId {
    core.hooks.subscribe(move |hit, state| {
        if hit.pierced && !hit.destroyed {
            state.damage *= multiplier;
        }
    })
}

fn steer_toward_target(core: &mut ProjectileCore, turn_rate: f64, delta: f64) {
    let state = &mut core.state;
    let Some(target) = state.homing_target else {
        return;
    };
    let speed = state.velocity.length();
    let (Some(current), Some(desired)) = (
        state.velocity.try_normalize(),
        (target - state.position).try_normalize(),
    ) else {
        return;
    };

    let max_turn = (turn_rate * delta).to_radians().max(0.0);
    let angle = current.angle_between(desired);
    let heading = if angle <= max_turn {
        desired
    } else {
        let axis = current.cross(desired).try_normalize().unwrap_or(DVec3::Y);
        (DQuat::from_axis_angle(axis, max_turn) * current).normalize()
    };
    state.velocity = heading * speed;
}
