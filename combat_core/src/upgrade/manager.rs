//! UpgradeManager - Handles and timers for temporary upgrades
//!
//! Permanent upgrades go straight to their targets. Temporary upgrades are
//! applied the same way, then tracked under a random handle until they expire
//! on the manager's clock or are cancelled; either path reverts the value on
//! every target still present.

use super::{ApplicationMode, HandleId, UpgradeError, UpgradeTargets, UpgradeType};
use crate::events::{CombatEvent, EventBus};
use crate::types::{EntityId, TIME_EPSILON};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default cap on concurrently active temporary upgrades
pub const DEFAULT_MAX_ACTIVE: usize = 50;

/// Bookkeeping for one live temporary upgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryRecord {
    pub handle: HandleId,
    pub upgrade: UpgradeType,
    pub value: f64,
    pub targets: Vec<EntityId>,
    /// Change each target actually took, reverted on removal
    pub applied: Vec<(EntityId, f64)>,
    pub start_time: f64,
    pub duration: f64,
}

impl TemporaryRecord {
    pub fn expire_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Seconds left at clock time `now`
    pub fn remaining(&self, now: f64) -> f64 {
        (self.expire_time() - now).max(0.0)
    }
}

/// Why a temporary upgrade left the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    Expired,
    Cancelled,
}

/// Draw a non-zero handle that `is_live` does not already claim
pub fn fresh_handle<R: Rng + ?Sized>(rng: &mut R, is_live: impl Fn(HandleId) -> bool) -> HandleId {
    loop {
        let handle = HandleId(rng.gen());
        if handle.0 != 0 && !is_live(handle) {
            return handle;
        }
    }
}

/// Registry of temporary upgrades
#[derive(Debug)]
pub struct UpgradeManager {
    records: HashMap<HandleId, TemporaryRecord>,
    clock: f64,
    max_active: usize,
    rng: StdRng,
}

impl Default for UpgradeManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ACTIVE)
    }
}

impl UpgradeManager {
    /// Create a manager with entropy-seeded handles
    pub fn new(max_active: usize) -> Self {
        Self::with_rng(max_active, StdRng::from_entropy())
    }

    /// Create a manager with reproducible handles
    pub fn with_seed(max_active: usize, seed: u64) -> Self {
        Self::with_rng(max_active, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_active: usize, rng: StdRng) -> Self {
        UpgradeManager {
            records: HashMap::new(),
            clock: 0.0,
            max_active,
            rng,
        }
    }

    /// Seconds accumulated through [`tick`](Self::tick)
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn active_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_active(&self, handle: HandleId) -> bool {
        self.records.contains_key(&handle)
    }

    pub fn record(&self, handle: HandleId) -> Option<&TemporaryRecord> {
        self.records.get(&handle)
    }

    /// Seconds until `handle` expires
    pub fn remaining(&self, handle: HandleId) -> Option<f64> {
        self.records.get(&handle).map(|r| r.remaining(self.clock))
    }

    /// Live handles, soonest expiry first
    pub fn active_handles(&self) -> Vec<HandleId> {
        let mut records: Vec<&TemporaryRecord> = self.records.values().collect();
        records.sort_by(|a, b| {
            a.expire_time()
                .total_cmp(&b.expire_time())
                .then(a.handle.cmp(&b.handle))
        });
        records.into_iter().map(|r| r.handle).collect()
    }

    /// Apply an upgrade to every target
    ///
    /// Targets are validated up front; a failure leaves every target
    /// untouched. Temporary upgrades return the handle that tracks them.
    #[allow(clippy::too_many_arguments)]
    pub fn apply<W: UpgradeTargets + ?Sized>(
        &mut self,
        upgrade: UpgradeType,
        value: f64,
        mode: ApplicationMode,
        duration: f64,
        targets: &[EntityId],
        world: &mut W,
        events: &mut EventBus,
    ) -> Result<Option<HandleId>, UpgradeError> {
        if !value.is_finite() {
            tracing::warn!(%upgrade, value, "rejected non-finite upgrade value");
            return Err(UpgradeError::InvalidValue(value));
        }
        let targets = unique(targets);
        self.validate(upgrade, &targets, world)?;

        if mode == ApplicationMode::Temporary {
            if !(duration > 0.0) || !duration.is_finite() {
                tracing::warn!(%upgrade, duration, "rejected temporary upgrade duration");
                return Err(UpgradeError::InvalidDuration(duration));
            }
            if self.records.len() >= self.max_active {
                tracing::warn!(
                    %upgrade,
                    limit = self.max_active,
                    "temporary upgrade limit reached"
                );
                return Err(UpgradeError::CapacityReached(self.max_active));
            }
        }

        let mut applied = Vec::with_capacity(targets.len());
        for &target in &targets {
            if let Some(receiver) = world.target_mut(target) {
                if let Some(delta) = receiver.apply_upgrade(upgrade, value, events) {
                    applied.push((target, delta));
                }
            }
        }

        match mode {
            ApplicationMode::Permanent => {
                tracing::debug!(%upgrade, value, targets = targets.len(), "permanent upgrade applied");
                Ok(None)
            }
            ApplicationMode::Temporary => {
                let records = &self.records;
                let handle = fresh_handle(&mut self.rng, |h| records.contains_key(&h));
                self.records.insert(
                    handle,
                    TemporaryRecord {
                        handle,
                        upgrade,
                        value,
                        targets,
                        applied,
                        start_time: self.clock,
                        duration,
                    },
                );
                events.publish(CombatEvent::UpgradeApplied {
                    handle,
                    upgrade,
                    value,
                });
                tracing::debug!(%handle, %upgrade, value, duration, "temporary upgrade registered");
                Ok(Some(handle))
            }
        }
    }

    /// Remove an upgrade
    ///
    /// With a handle this cancels that temporary upgrade (its recorded value
    /// and targets are used). Without one it reverts a permanent `value`
    /// from `targets`.
    #[allow(clippy::too_many_arguments)]
    pub fn remove<W: UpgradeTargets + ?Sized>(
        &mut self,
        upgrade: UpgradeType,
        value: f64,
        handle: Option<HandleId>,
        targets: &[EntityId],
        world: &mut W,
        events: &mut EventBus,
    ) -> bool {
        if let Some(handle) = handle {
            let Some(record) = self.records.get(&handle) else {
                return false;
            };
            if record.upgrade != upgrade {
                tracing::warn!(%handle, expected = %upgrade, actual = %record.upgrade, "handle type mismatch");
                return false;
            }
            return self.cancel(handle, world, events);
        }

        if !value.is_finite() {
            tracing::warn!(%upgrade, value, "rejected non-finite removal value");
            return false;
        }
        let targets = unique(targets);
        if let Err(err) = self.validate(upgrade, &targets, world) {
            tracing::warn!(%upgrade, %err, "permanent removal rejected");
            return false;
        }
        let mut removed = false;
        for target in targets {
            if let Some(receiver) = world.target_mut(target) {
                removed |= receiver.remove_upgrade(upgrade, value, events);
            }
        }
        removed
    }

    /// Cancel a live temporary upgrade; false if the handle is not live
    pub fn cancel<W: UpgradeTargets + ?Sized>(
        &mut self,
        handle: HandleId,
        world: &mut W,
        events: &mut EventBus,
    ) -> bool {
        self.finish(handle, RemovalCause::Cancelled, world, events)
    }

    /// Cancel every live temporary upgrade
    pub fn cancel_all<W: UpgradeTargets + ?Sized>(&mut self, world: &mut W, events: &mut EventBus) {
        for handle in self.active_handles() {
            self.finish(handle, RemovalCause::Cancelled, world, events);
        }
    }

    /// Advance the clock and expire due upgrades
    ///
    /// Upgrades due in the same tick expire in order of expiry time, ties
    /// broken by handle. Returns the expired handles.
    pub fn tick<W: UpgradeTargets + ?Sized>(
        &mut self,
        delta: f64,
        world: &mut W,
        events: &mut EventBus,
    ) -> Vec<HandleId> {
        if !(delta >= 0.0) || !delta.is_finite() {
            tracing::warn!(delta, "ignored invalid upgrade tick");
            return Vec::new();
        }
        self.clock += delta;

        let now = self.clock;
        let due: Vec<HandleId> = self
            .active_handles()
            .into_iter()
            .filter(|h| {
                self.records
                    .get(h)
                    .is_some_and(|r| r.expire_time() <= now + TIME_EPSILON)
            })
            .collect();
        for &handle in &due {
            self.finish(handle, RemovalCause::Expired, world, events);
        }
        due
    }

    fn validate<W: UpgradeTargets + ?Sized>(
        &self,
        upgrade: UpgradeType,
        targets: &[EntityId],
        world: &W,
    ) -> Result<(), UpgradeError> {
        if targets.is_empty() {
            tracing::warn!(%upgrade, "upgrade without targets");
            return Err(UpgradeError::NoTargets);
        }
        for &target in targets {
            match world.target(target) {
                None => {
                    tracing::warn!(%upgrade, %target, "upgrade target does not exist");
                    return Err(UpgradeError::UnknownTarget(target));
                }
                Some(receiver) if !receiver.can_receive(upgrade) => {
                    tracing::warn!(%upgrade, %target, "target cannot receive upgrade");
                    return Err(UpgradeError::UnsupportedType { target, upgrade });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Erase the record first, then revert and notify
    fn finish<W: UpgradeTargets + ?Sized>(
        &mut self,
        handle: HandleId,
        cause: RemovalCause,
        world: &mut W,
        events: &mut EventBus,
    ) -> bool {
        let Some(record) = self.records.remove(&handle) else {
            return false;
        };
        for &(target, delta) in &record.applied {
            match world.target_mut(target) {
                Some(receiver) => {
                    receiver.remove_upgrade(record.upgrade, delta, events);
                }
                None => tracing::debug!(%handle, %target, "upgrade target gone before removal"),
            }
        }
        let upgrade = record.upgrade;
        events.publish(match cause {
            RemovalCause::Expired => CombatEvent::UpgradeExpired { handle, upgrade },
            RemovalCause::Cancelled => CombatEvent::UpgradeCancelled { handle, upgrade },
        });
        tracing::debug!(%handle, %upgrade, ?cause, "temporary upgrade removed");
        true
    }
}

fn unique(targets: &[EntityId]) -> Vec<EntityId> {
    let mut seen = Vec::with_capacity(targets.len());
    for &target in targets {
        if !seen.contains(&target) {
            seen.push(target);
        }
    }
    seen
}
