//! combat_sim - Headless duel between two armed combatants
//!
//! Usage: `combat_sim [seed] [max_seconds]`
//!
//! Runs a fixed-step fight on a line, buys a temporary upgrade for the player
//! up front, and reports who won, how long it took and how many shots each
//! side fired. `RUST_LOG=combat_core=debug` traces every state change.

use anyhow::{Context, Result};
use combat_core::config::UpgradeConstants;
use combat_core::prelude::*;
use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DT: f64 = 1.0 / 60.0;
const HIT_RADIUS: f64 = 0.75;
const STARTING_WALLET: u32 = 100;

/// Per-side counters for the final report
#[derive(Debug, Default)]
struct Tally {
    shots: u32,
    hits: u32,
    damage: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("combat_sim=info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = match args.next() {
        Some(raw) => raw.parse().context("seed must be an unsigned integer")?,
        None => 42,
    };
    let max_time: f64 = match args.next() {
        Some(raw) => raw.parse().context("max_seconds must be a number")?,
        None => 60.0,
    };

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let weapons = default_weapons();
    let rifle = weapons.get("rifle").context("built-in rifle missing")?;
    let smg = weapons.get("smg").context("built-in smg missing")?;

    let mut arena = Arena::new(CombatConstants {
        upgrades: UpgradeConstants {
            handle_seed: Some(seed),
            ..UpgradeConstants::default()
        },
        ..CombatConstants::default()
    });
    arena.events_mut().subscribe(|event| match event.to_json() {
        Ok(json) => debug!(target: "combat_sim::events", "{json}"),
        Err(err) => warn!(%err, "event not serializable"),
    });

    let player = arena.spawn(
        TeamId(0),
        BaseStats {
            max_health: 150.0,
            attack: 10.0,
            ..BaseStats::default()
        },
        Some(rifle),
    );
    let enemy = arena.spawn(
        TeamId(1),
        BaseStats {
            max_health: 120.0,
            attack: 5.0,
            ..BaseStats::default()
        },
        Some(smg),
    );
    let positions: HashMap<EntityId, DVec3> =
        HashMap::from([(player, DVec3::ZERO), (enemy, DVec3::new(20.0, 0.0, 0.0))]);

    let catalog = default_upgrades();
    let mut wallet = STARTING_WALLET;
    if let Some(adrenaline) = catalog.get("adrenaline") {
        match arena.purchase(adrenaline, &mut wallet, &[player]) {
            Ok(handle) => info!(?handle, wallet, "player bought {}", adrenaline.name),
            Err(err) => warn!(%err, "purchase failed"),
        }
    }

    info!(seed, max_time, "duel starting: {} vs {}", rifle.name, smg.name);

    let mut tallies: HashMap<EntityId, Tally> = HashMap::new();
    let mut winner = None;
    let mut time = 0.0;

    while time < max_time && winner.is_none() {
        for (shooter, target) in [(player, enemy), (enemy, player)] {
            let origin = positions[&shooter];
            let aim = positions[&target] - origin;
            if arena.fire(shooter, origin, aim, &mut rng).is_some() {
                tallies.entry(shooter).or_default().shots += 1;
            }
        }

        arena.tick(DT);
        time += DT;

        for id in arena.projectile_ids() {
            let Some(projectile) = arena.projectile(id) else {
                continue;
            };
            let owner = projectile.owner();
            let position = projectile.state().position;
            let struck = [player, enemy]
                .into_iter()
                .find(|e| *e != owner && position.distance(positions[e]) <= HIT_RADIUS);
            let Some(target) = struck else {
                continue;
            };
            if let Some(result) = arena.projectile_hit(id, target) {
                debug!(%owner, %target, "{}", result.summary());
                let tally = tallies.entry(owner).or_default();
                if result.landed() {
                    tally.hits += 1;
                    tally.damage += result.damage_applied;
                }
            }
        }

        for event in arena.drain_events() {
            match event {
                CombatEvent::Kill { attacker, target } => {
                    info!(%attacker, %target, time, "kill");
                    winner = Some(attacker);
                }
                CombatEvent::UpgradeExpired { handle, upgrade } => {
                    info!(%handle, %upgrade, time, "upgrade expired");
                }
                _ => {}
            }
        }
    }

    println!("=== Duel (seed {seed}) ===");
    match winner {
        Some(id) => println!("Winner: {id} after {time:.2}s"),
        None => println!("No winner after {time:.2}s"),
    }
    for (label, id) in [("Player", player), ("Enemy", enemy)] {
        let tally = tallies.remove(&id).unwrap_or_default();
        let health = arena.combatant(id).map_or(0.0, |c| c.ledger().health());
        let accuracy = if tally.shots > 0 {
            tally.hits as f64 / tally.shots as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "{label:<7} shots {:>4}  hits {:>4} ({accuracy:>5.1}%)  damage {:>7.1}  health {health:>6.1}",
            tally.shots, tally.hits, tally.damage
        );
    }

    Ok(())
}
