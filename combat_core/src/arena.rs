//! Arena - Owns combatants, projectiles and upgrades for one fight
//!
//! The arena is driven by an outer loop: `tick` once per frame, `fire` on
//! input, `projectile_hit` when the collision layer reports a contact.
//! Per-tick order is fixed:
//! 1. invulnerability countdowns
//! 2. weapons (cooldown, recoil recovery, accuracy recompute)
//! 3. projectiles (effects, integration, lifetime)
//! 4. temporary upgrade timers

use crate::combat::{
    resolve_interaction, AttackerInfo, CombatParticipant, Combatant, InteractionResult,
};
use crate::config::CombatConstants;
use crate::events::{CombatEvent, EventBus};
use crate::ledger::BaseStats;
use crate::projectile::Projectile;
use crate::types::{EntityId, ProjectileId, TeamId};
use crate::upgrade::{
    ApplicationMode, HandleId, PurchaseHistory, UpgradeDefinition, UpgradeError, UpgradeManager,
    UpgradeType,
};
use crate::weapon::{Weapon, WeaponDefinition};
use glam::DVec3;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug)]
pub struct Arena {
    constants: CombatConstants,
    combatants: BTreeMap<EntityId, Combatant>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    /// Split children skip the entity their parent was splitting on
    ignore_target: HashMap<ProjectileId, EntityId>,
    upgrades: UpgradeManager,
    history: PurchaseHistory,
    events: EventBus,
    clock: f64,
    next_entity: u32,
    next_projectile: u64,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(CombatConstants::default())
    }
}

impl Arena {
    pub fn new(constants: CombatConstants) -> Self {
        let cap = constants.upgrades.max_temporary_effects;
        let upgrades = match constants.upgrades.handle_seed {
            Some(seed) => UpgradeManager::with_seed(cap, seed),
            None => UpgradeManager::new(cap),
        };
        Arena {
            constants,
            combatants: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            ignore_target: HashMap::new(),
            upgrades,
            history: PurchaseHistory::new(),
            events: EventBus::new(),
            clock: 0.0,
            next_entity: 1,
            next_projectile: 1,
        }
    }

    pub fn constants(&self) -> &CombatConstants {
        &self.constants
    }

    /// Seconds simulated so far
    pub fn clock(&self) -> f64 {
        self.clock
    }

    // === Combatants ===

    /// Add a combatant, optionally armed, and return its id
    pub fn spawn(&mut self, team: TeamId, base: BaseStats, weapon: Option<&WeaponDefinition>) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;

        let mut combatant = Combatant::new(id, team, base, self.constants.damage.invulnerability_duration);
        if let Some(definition) = weapon {
            combatant.equip(self.build_weapon(definition));
        }
        self.combatants.insert(id, combatant);
        tracing::debug!(entity = %id, team = team.0, "spawned");
        id
    }

    /// Weapon instance using this arena's accuracy tunables
    pub fn build_weapon(&self, definition: &WeaponDefinition) -> Weapon {
        Weapon::new(definition, self.constants.accuracy, self.constants.fire_modes)
    }

    /// Remove a combatant; live upgrades skip it from now on
    pub fn despawn(&mut self, id: EntityId) -> Option<Combatant> {
        self.combatants.remove(&id)
    }

    pub fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    pub fn combatant_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values()
    }

    /// Open `id`'s invulnerability window for `duration` seconds
    pub fn make_invulnerable(&mut self, id: EntityId, duration: f64) -> bool {
        match self.combatants.get_mut(&id) {
            Some(combatant) => combatant.make_invulnerable(duration, &mut self.events),
            None => false,
        }
    }

    // === Projectiles ===

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    pub fn projectile_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.projectiles.get_mut(&id)
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn projectile_ids(&self) -> Vec<ProjectileId> {
        self.projectiles.keys().copied().collect()
    }

    /// Fire `shooter`'s weapon from `origin` toward `aim`
    ///
    /// Returns the new projectile, or `None` when the shooter is missing,
    /// dead, unarmed or still cooling down.
    pub fn fire(&mut self, shooter: EntityId, origin: DVec3, aim: DVec3, rng: &mut impl Rng) -> Option<ProjectileId> {
        let combatant = self.combatants.get_mut(&shooter)?;
        if !combatant.ledger().is_alive() {
            tracing::debug!(entity = %shooter, "dead combatant cannot fire");
            return None;
        }
        let team = combatant.team();
        let shot = combatant.weapon_mut()?.try_fire(origin, aim, rng)?;

        let id = self.allocate_projectile_ids(1);
        self.projectiles
            .insert(id, Projectile::from_shot(id, shooter, team, &shot));
        Some(id)
    }

    /// Resolve a collision between a projectile and a combatant
    ///
    /// Runs the projectile's hit chain, spawns split children, then resolves
    /// damage between the projectile's owner and `target`. Returns `None` when
    /// the projectile no longer exists or ignores that target.
    pub fn projectile_hit(&mut self, projectile: ProjectileId, target: EntityId) -> Option<InteractionResult> {
        if self.ignore_target.get(&projectile) == Some(&target) {
            return None;
        }
        let proj = self.projectiles.get_mut(&projectile)?;
        let report = proj.hit(target)?;
        let requests = proj.take_split_requests();
        let child_lifetime = proj.state().lifetime_remaining;
        if report.destroyed {
            self.projectiles.remove(&projectile);
            self.ignore_target.remove(&projectile);
        }

        for request in requests {
            let first = self.allocate_projectile_ids(request.count as u64);
            for child in Projectile::children_of(&request, first.0, child_lifetime) {
                self.ignore_target.insert(child.id(), request.hit_target);
                self.projectiles.insert(child.id(), child);
            }
        }

        let attacker = self.combatants.get(&report.owner).map(AttackerInfo::of);
        let result = resolve_interaction(
            attacker,
            self.combatants.get_mut(&target),
            report.damage,
            self.constants.damage.attack_scaling,
            &mut self.events,
        );
        Some(result)
    }

    /// Resolve a direct (non-projectile) hit
    pub fn strike(&mut self, attacker: EntityId, target: EntityId, base_damage: f64) -> InteractionResult {
        let attacker = self.combatants.get(&attacker).map(AttackerInfo::of);
        resolve_interaction(
            attacker,
            self.combatants.get_mut(&target),
            base_damage,
            self.constants.damage.attack_scaling,
            &mut self.events,
        )
    }

    fn allocate_projectile_ids(&mut self, count: u64) -> ProjectileId {
        let first = ProjectileId(self.next_projectile);
        self.next_projectile += count.max(1);
        first
    }

    // === Upgrades ===

    pub fn upgrades(&self) -> &UpgradeManager {
        &self.upgrades
    }

    pub fn purchase_history(&self) -> &PurchaseHistory {
        &self.history
    }

    pub fn apply_upgrade(
        &mut self,
        upgrade: UpgradeType,
        value: f64,
        mode: ApplicationMode,
        duration: f64,
        targets: &[EntityId],
    ) -> Result<Option<HandleId>, UpgradeError> {
        self.upgrades.apply(
            upgrade,
            value,
            mode,
            duration,
            targets,
            &mut self.combatants,
            &mut self.events,
        )
    }

    pub fn remove_upgrade(
        &mut self,
        upgrade: UpgradeType,
        value: f64,
        handle: Option<HandleId>,
        targets: &[EntityId],
    ) -> bool {
        self.upgrades.remove(
            upgrade,
            value,
            handle,
            targets,
            &mut self.combatants,
            &mut self.events,
        )
    }

    pub fn cancel_upgrade(&mut self, handle: HandleId) -> bool {
        self.upgrades.cancel(handle, &mut self.combatants, &mut self.events)
    }

    /// Buy `definition` for `targets`, paying from `wallet`
    pub fn purchase(
        &mut self,
        definition: &UpgradeDefinition,
        wallet: &mut u32,
        targets: &[EntityId],
    ) -> Result<Option<HandleId>, UpgradeError> {
        self.history.try_purchase(
            definition,
            wallet,
            targets,
            &mut self.upgrades,
            &mut self.combatants,
            &mut self.events,
        )
    }

    // === Events ===

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Take queued events; call once per frame unless queueing is turned off
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }

    // === Simulation ===

    /// Advance the fight by `delta` seconds
    pub fn tick(&mut self, delta: f64) {
        if !(delta >= 0.0) || !delta.is_finite() {
            tracing::warn!(delta, "ignored invalid arena tick");
            return;
        }
        self.clock += delta;

        for combatant in self.combatants.values_mut() {
            combatant.tick_invulnerability(delta, &mut self.events);
        }
        for combatant in self.combatants.values_mut() {
            combatant.tick_weapon(delta);
        }

        for projectile in self.projectiles.values_mut() {
            projectile.update(delta);
        }
        let expired: Vec<ProjectileId> = self
            .projectiles
            .iter()
            .filter(|(_, p)| p.is_destroyed())
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            self.projectiles.remove(&id);
            self.ignore_target.remove(&id);
        }

        self.upgrades.tick(delta, &mut self.combatants, &mut self.events);
    }
}
