//! Event bus for combat notifications
//!
//! Observers (UI, audio, AI) subscribe with a callback and get every event as it
//! is published. Events are also queued so a frame loop can `drain` them; the
//! queue grows until drained, so hosts that only subscribe should turn it off
//! with [`EventBus::set_queueing`].

use crate::types::{EntityId, StatKey};
use crate::upgrade::{HandleId, UpgradeType};
use serde::{Deserialize, Serialize};

/// Events raised by the combat core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    /// A ledger value actually changed
    StatChanged {
        entity: EntityId,
        key: StatKey,
        old: f64,
        new: f64,
    },
    /// Damage reached an entity's ledger (amount already clamped to remaining health)
    DamageTaken {
        entity: EntityId,
        attacker: Option<EntityId>,
        amount: f64,
    },
    /// An entity's health reached zero
    Died {
        entity: EntityId,
        killer: Option<EntityId>,
    },
    /// A resolved attacker/target interaction that applied damage
    Interaction {
        attacker: EntityId,
        target: EntityId,
        damage: f64,
    },
    /// An interaction moved the target from alive to dead
    Kill { attacker: EntityId, target: EntityId },
    /// Invulnerability window opened
    InvulnerabilityStarted { entity: EntityId, duration: f64 },
    /// Invulnerability window closed
    InvulnerabilityEnded { entity: EntityId },
    /// A temporary upgrade was registered and applied
    UpgradeApplied {
        handle: HandleId,
        upgrade: UpgradeType,
        value: f64,
    },
    /// A temporary upgrade ran out naturally
    UpgradeExpired { handle: HandleId, upgrade: UpgradeType },
    /// A temporary upgrade was cancelled before expiry
    UpgradeCancelled { handle: HandleId, upgrade: UpgradeType },
}

impl CombatEvent {
    /// One-line JSON form for logs and replays
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Identifier returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&CombatEvent)>;

/// Observer list plus a queue of published events
pub struct EventBus {
    observers: Vec<(SubscriptionId, Observer)>,
    queue: Vec<CombatEvent>,
    queueing: bool,
    next_id: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus {
            observers: Vec::new(),
            queue: Vec::new(),
            queueing: true,
            next_id: 0,
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("queued", &self.queue.len())
            .field("queueing", &self.queueing)
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: impl FnMut(&CombatEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Turn the drain queue on or off. Turning it off drops anything pending.
    pub fn set_queueing(&mut self, enabled: bool) {
        self.queueing = enabled;
        if !enabled {
            self.queue.clear();
        }
    }

    pub fn is_queueing(&self) -> bool {
        self.queueing
    }

    /// Notify all observers and queue the event
    pub fn publish(&mut self, event: CombatEvent) {
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
        if self.queueing {
            self.queue.push(event);
        }
    }

    /// Events queued since the last drain
    pub fn pending(&self) -> &[CombatEvent] {
        &self.queue
    }

    /// Take all queued events
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.queue)
    }
}
