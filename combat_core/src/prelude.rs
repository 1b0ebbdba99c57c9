//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Core types
pub use crate::types::{EntityId, ProjectileId, StatKey, TeamId};
pub use crate::events::{CombatEvent, EventBus};
pub use crate::ledger::{BaseStats, StatLedger};

// Combat
pub use crate::arena::Arena;
pub use crate::combat::{CombatParticipant, Combatant, DamageAcceptor, InteractionResult};

// Weapons and projectiles
pub use crate::accuracy::FireMode;
pub use crate::projectile::{Projectile, ProjectileEffect};
pub use crate::weapon::{ModifierPresets, Weapon, WeaponDefinition, WeaponModifier, WeaponStats};

// Upgrades
pub use crate::upgrade::{ApplicationMode, HandleId, Upgradable, UpgradeManager, UpgradeType};

// Config
pub use crate::config::{default_upgrades, default_weapons, CombatConstants};
