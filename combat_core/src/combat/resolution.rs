//! Interaction resolution - Apply an attacker's hit to a target

use super::result::{InteractionResult, Rejection};
use super::{AttackerInfo, CombatParticipant, DamageAcceptor};
use crate::events::{CombatEvent, EventBus};

/// `base_damage + attack * attack_scaling`
pub fn final_damage(base_damage: f64, attack: f64, attack_scaling: f64) -> f64 {
    base_damage + attack * attack_scaling
}

/// Resolve one interaction between an attacker and a target
///
/// Rejected (0 damage, no events) when either party is missing, the base
/// damage is non-finite or not positive, both share a team, or the target is
/// already dead. Otherwise:
/// 1. Scales the base damage by the attacker's attack stat
/// 2. Hands it to the target's acceptor
/// 3. Publishes an interaction event if any damage was applied
/// 4. Publishes a kill event if the target went from alive to dead
///
/// The attacker does not have to be alive.
pub fn resolve_interaction<T>(
    attacker: Option<AttackerInfo>,
    target: Option<&mut T>,
    base_damage: f64,
    attack_scaling: f64,
    events: &mut EventBus,
) -> InteractionResult
where
    T: CombatParticipant + DamageAcceptor + ?Sized,
{
    let attacker_id = attacker.map(|a| a.id);
    let target_id = target.as_ref().map(|t| t.entity_id());

    let Some(attacker) = attacker else {
        tracing::warn!(target = ?target_id, "interaction without attacker");
        return InteractionResult::rejected(attacker_id, target_id, Rejection::MissingAttacker);
    };
    let Some(target) = target else {
        tracing::warn!(attacker = %attacker.id, "interaction without target");
        return InteractionResult::rejected(attacker_id, target_id, Rejection::MissingTarget);
    };
    if !base_damage.is_finite() || base_damage <= 0.0 {
        tracing::warn!(attacker = %attacker.id, target = %target.entity_id(), base_damage, "invalid base damage");
        return InteractionResult::rejected(attacker_id, target_id, Rejection::InvalidDamage);
    }
    if attacker.team == target.team() {
        tracing::warn!(attacker = %attacker.id, target = %target.entity_id(), "same-team interaction");
        return InteractionResult::rejected(attacker_id, target_id, Rejection::SameTeam);
    }
    if !target.is_alive() {
        tracing::warn!(attacker = %attacker.id, target = %target.entity_id(), "target already dead");
        return InteractionResult::rejected(attacker_id, target_id, Rejection::TargetDead);
    }

    let mut result = InteractionResult {
        attacker: attacker_id,
        target: target_id,
        final_damage: final_damage(base_damage, attacker.attack, attack_scaling),
        health_before: target.health(),
        ..InteractionResult::default()
    };

    result.damage_applied = target.accept_damage(result.final_damage, Some(attacker.id), events);
    result.health_after = target.health();

    if result.landed() {
        events.publish(CombatEvent::Interaction {
            attacker: attacker.id,
            target: target.entity_id(),
            damage: result.damage_applied,
        });
    }
    if result.landed() && !target.is_alive() {
        result.is_killing_blow = true;
        events.publish(CombatEvent::Kill {
            attacker: attacker.id,
            target: target.entity_id(),
        });
        tracing::debug!(attacker = %attacker.id, target = %target.entity_id(), "kill");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Combatant;
    use crate::ledger::BaseStats;
    use crate::types::{EntityId, StatKey, TeamId};

    fn fighter(id: u32, team: u8, attack: f64, max_health: f64) -> Combatant {
        Combatant::new(
            EntityId(id),
            TeamId(team),
            BaseStats {
                max_health,
                attack,
                ..BaseStats::default()
            },
            0.5,
        )
    }

    fn kinds(events: &mut EventBus) -> Vec<&'static str> {
        events
            .drain()
            .into_iter()
            .map(|e| match e {
                CombatEvent::Interaction { .. } => "interaction",
                CombatEvent::Kill { .. } => "kill",
                CombatEvent::DamageTaken { .. } => "damage",
                CombatEvent::Died { .. } => "died",
                CombatEvent::StatChanged { .. } => "stat",
                CombatEvent::InvulnerabilityStarted { .. } => "invuln",
                _ => "other",
            })
            .collect()
    }

    #[test]
    fn test_basic_damage() {
        let attacker = fighter(1, 0, 20.0, 100.0);
        let mut target = fighter(2, 1, 0.0, 100.0);
        let mut events = EventBus::new();

        let result = resolve_interaction(
            Some(AttackerInfo::of(&attacker)),
            Some(&mut target),
            10.0,
            0.1,
            &mut events,
        );

        assert!((result.final_damage - 12.0).abs() < 1e-9);
        assert!((result.damage_applied - 12.0).abs() < 1e-9);
        assert!((target.ledger().health() - 88.0).abs() < 1e-9);
        assert!(!result.is_killing_blow);
        assert_eq!(kinds(&mut events), vec!["stat", "damage", "invuln", "interaction"]);
    }

    #[test]
    fn test_killing_blow() {
        let attacker = fighter(1, 0, 0.0, 100.0);
        let mut target = fighter(2, 1, 0.0, 5.0);
        let mut events = EventBus::new();

        let result = resolve_interaction(
            Some(AttackerInfo::of(&attacker)),
            Some(&mut target),
            10.0,
            0.1,
            &mut events,
        );

        assert!(result.is_killing_blow);
        assert!((result.damage_applied - 5.0).abs() < 1e-9);
        let kinds = kinds(&mut events);
        assert_eq!(kinds.iter().filter(|k| **k == "kill").count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == "died").count(), 1);
        assert_eq!(kinds.last(), Some(&"kill"));
    }

    #[test]
    fn test_rejections_have_no_side_effects() {
        let attacker = fighter(1, 0, 0.0, 100.0);
        let mut ally = fighter(2, 0, 0.0, 100.0);
        let mut events = EventBus::new();
        let info = Some(AttackerInfo::of(&attacker));

        let same_team = resolve_interaction(info, Some(&mut ally), 10.0, 0.1, &mut events);
        assert_eq!(same_team.rejection, Some(Rejection::SameTeam));

        let mut enemy = fighter(3, 1, 0.0, 100.0);
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let r = resolve_interaction(info, Some(&mut enemy), bad, 0.1, &mut events);
            assert_eq!(r.rejection, Some(Rejection::InvalidDamage));
        }

        let missing = resolve_interaction::<Combatant>(info, None, 10.0, 0.1, &mut events);
        assert_eq!(missing.rejection, Some(Rejection::MissingTarget));

        let no_attacker = resolve_interaction(None, Some(&mut enemy), 10.0, 0.1, &mut events);
        assert_eq!(no_attacker.rejection, Some(Rejection::MissingAttacker));

        assert!(events.pending().is_empty());
        assert!((enemy.ledger().health() - 100.0).abs() < f64::EPSILON);
        assert!((ally.ledger().health() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dead_target_rejected() {
        let attacker = fighter(1, 0, 0.0, 100.0);
        let mut target = fighter(2, 1, 0.0, 5.0);
        let mut events = EventBus::new();
        let info = Some(AttackerInfo::of(&attacker));

        resolve_interaction(info, Some(&mut target), 10.0, 0.1, &mut events);
        target.tick_invulnerability(1.0, &mut events);
        events.drain();

        let result = resolve_interaction(info, Some(&mut target), 10.0, 0.1, &mut events);
        assert_eq!(result.rejection, Some(Rejection::TargetDead));
        assert!(events.pending().is_empty());
    }

    #[test]
    fn test_target_zeroed_outside_combat_is_dead() {
        let attacker = fighter(1, 0, 0.0, 100.0);
        let mut target = fighter(2, 1, 0.0, 50.0);
        let mut events = EventBus::new();

        target.ledger_mut().set(StatKey::Health, 0.0, &mut events);
        assert!(!target.is_alive());
        events.drain();

        let result =
            resolve_interaction(Some(AttackerInfo::of(&attacker)), Some(&mut target), 10.0, 0.1, &mut events);
        assert_eq!(result.rejection, Some(Rejection::TargetDead));
        assert!(!result.is_killing_blow);
        assert!(events.pending().is_empty());
    }

    #[test]
    fn test_invulnerable_target_absorbs() {
        let attacker = fighter(1, 0, 0.0, 100.0);
        let mut target = fighter(2, 1, 0.0, 100.0);
        let mut events = EventBus::new();
        let info = Some(AttackerInfo::of(&attacker));

        resolve_interaction(info, Some(&mut target), 10.0, 0.1, &mut events);
        events.drain();

        let second = resolve_interaction(info, Some(&mut target), 10.0, 0.1, &mut events);
        assert!(second.was_absorbed());
        assert!((target.ledger().health() - 90.0).abs() < 1e-9);
        assert!(events.pending().is_empty());
    }

    #[test]
    fn test_dead_attacker_still_lands() {
        let mut attacker = fighter(1, 0, 10.0, 5.0);
        let mut events = EventBus::new();
        attacker.accept_damage(50.0, None, &mut events);
        assert!(!attacker.ledger().is_alive());

        let mut target = fighter(2, 1, 0.0, 100.0);
        let result = resolve_interaction(
            Some(AttackerInfo::of(&attacker)),
            Some(&mut target),
            10.0,
            0.1,
            &mut events,
        );
        assert!((result.damage_applied - 11.0).abs() < 1e-9);
    }
}
