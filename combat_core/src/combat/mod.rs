//! Combat resolution - Validate an attacker/target pair and apply damage

mod combatant;
mod resolution;
mod result;

pub use combatant::Combatant;
pub use resolution::{final_damage, resolve_interaction};
pub use result::{InteractionResult, Rejection};

use crate::events::EventBus;
use crate::types::{EntityId, TeamId};

/// Read-only view of an entity taking part in an interaction
pub trait CombatParticipant {
    fn entity_id(&self) -> EntityId;
    fn team(&self) -> TeamId;
    fn is_alive(&self) -> bool;
    /// Attack stat used for damage scaling
    fn attack(&self) -> f64;
    fn health(&self) -> f64;
}

/// Entry point for incoming damage
///
/// Returns the damage actually applied; gates such as invulnerability may
/// return 0 without touching the ledger.
pub trait DamageAcceptor {
    fn accept_damage(&mut self, amount: f64, attacker: Option<EntityId>, events: &mut EventBus) -> f64;
}

/// Snapshot of the attacking side
///
/// Projectiles outlive their owner, so resolution works from a copy of the
/// attacker's id, team and attack rather than a live reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackerInfo {
    pub id: EntityId,
    pub team: TeamId,
    pub attack: f64,
}

impl AttackerInfo {
    pub fn of<P: CombatParticipant + ?Sized>(participant: &P) -> Self {
        AttackerInfo {
            id: participant.entity_id(),
            team: participant.team(),
            attack: participant.attack(),
        }
    }
}
