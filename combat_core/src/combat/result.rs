//! InteractionResult - Outcome of one attacker/target interaction

use crate::types::EntityId;
use serde::{Deserialize, Serialize};

/// Why an interaction was refused before any damage was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    MissingAttacker,
    MissingTarget,
    /// Base damage was non-finite or not positive
    InvalidDamage,
    SameTeam,
    TargetDead,
}

impl Rejection {
    pub fn describe(self) -> &'static str {
        match self {
            Rejection::MissingAttacker => "no attacker",
            Rejection::MissingTarget => "no target",
            Rejection::InvalidDamage => "invalid base damage",
            Rejection::SameTeam => "same team",
            Rejection::TargetDead => "target already dead",
        }
    }
}

/// Result of [`resolve_interaction`](super::resolve_interaction)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionResult {
    pub attacker: Option<EntityId>,
    pub target: Option<EntityId>,

    // === Damage ===
    /// Base damage plus attack scaling (0 when rejected)
    pub final_damage: f64,
    /// Damage the target's acceptor reported as applied
    pub damage_applied: f64,

    // === State Changes ===
    pub health_before: f64,
    pub health_after: f64,

    // === Flags ===
    pub rejection: Option<Rejection>,
    /// Target went from alive to dead in this interaction
    pub is_killing_blow: bool,
}

impl InteractionResult {
    pub(crate) fn rejected(
        attacker: Option<EntityId>,
        target: Option<EntityId>,
        reason: Rejection,
    ) -> Self {
        InteractionResult {
            attacker,
            target,
            rejection: Some(reason),
            ..Self::default()
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }

    /// Damage reached the ledger
    pub fn landed(&self) -> bool {
        self.damage_applied > 0.0
    }

    /// Damage computed but absorbed by the target (e.g. invulnerable)
    pub fn was_absorbed(&self) -> bool {
        !self.is_rejected() && !self.landed()
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        if let Some(reason) = self.rejection {
            return format!("Rejected: {}", reason.describe());
        }
        if self.was_absorbed() {
            return format!("{:.0} damage absorbed", self.final_damage);
        }

        let mut parts = vec![format!("{:.0} damage taken", self.damage_applied)];
        if self.damage_applied + 1e-9 < self.final_damage {
            parts.push(format!("{:.0} overkill", self.final_damage - self.damage_applied));
        }
        if self.is_killing_blow {
            parts.push("FATAL".to_string());
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_variants() {
        let rejected = InteractionResult::rejected(None, Some(EntityId(2)), Rejection::MissingAttacker);
        assert_eq!(rejected.summary(), "Rejected: no attacker");

        let absorbed = InteractionResult {
            final_damage: 12.0,
            ..Default::default()
        };
        assert!(absorbed.was_absorbed());
        assert_eq!(absorbed.summary(), "12 damage absorbed");

        let fatal = InteractionResult {
            final_damage: 30.0,
            damage_applied: 20.0,
            is_killing_blow: true,
            ..Default::default()
        };
        assert_eq!(fatal.summary(), "20 damage taken, 10 overkill, FATAL");
    }
}
