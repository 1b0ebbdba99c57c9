//! combat_core - Real-time combat core for action games
//!
//! This library provides:
//! - StatLedger: Per-entity clamped stats with change events
//! - InvulnerabilityWindow: Timed damage immunity after a hit
//! - Weapon pipeline: Prioritized, conditional stat modifiers over a base snapshot
//! - Accuracy model: Recoil, fire modes and cone-sampled spread
//! - Projectile effects: Mergeable pierce/split/homing chains with after-hit hooks
//! - Interaction resolution: Team/alive validation, attack scaling, kill events
//! - Upgrades: Permanent and timed buffs behind handles, with a purchase curve

pub mod accuracy;
pub mod arena;
pub mod combat;
pub mod config;
pub mod events;
pub mod ledger;
pub mod prelude;
pub mod projectile;
pub mod types;
pub mod upgrade;
pub mod weapon;

// Re-export core types for convenience
pub use arena::Arena;
pub use combat::{resolve_interaction, AttackerInfo, Combatant, InteractionResult, Rejection};
pub use config::{default_upgrades, default_weapons, CombatConstants, ConfigError};
pub use events::{CombatEvent, EventBus};
pub use ledger::{BaseStats, InvulnerabilityState, InvulnerabilityWindow, StatLedger};
pub use projectile::{Projectile, ProjectileEffect};
pub use types::{EntityId, ProjectileId, StatKey, TeamId};
pub use upgrade::{ApplicationMode, HandleId, UpgradeError, UpgradeManager, UpgradeType};
pub use weapon::{Weapon, WeaponDefinition, WeaponModifier, WeaponStats};
