//! After-hit hooks - Per-projectile observer list

use super::ProjectileState;
use crate::types::EntityId;

/// Identifier of a registered hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// What happened on the hit that just resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AfterHit {
    pub target: EntityId,
    /// The projectile passed through the target
    pub pierced: bool,
    /// The projectile is being destroyed by this hit
    pub destroyed: bool,
}

type AfterHitHook = Box<dyn FnMut(&AfterHit, &mut ProjectileState)>;

/// Hooks run after every hit, in registration order
///
/// Effects that subscribe during attach must unsubscribe in their destroy
/// handler; [`HitHooks::len`] lets callers verify nothing is left behind.
#[derive(Default)]
pub struct HitHooks {
    hooks: Vec<(HookId, AfterHitHook)>,
    next_id: u64,
}

impl std::fmt::Debug for HitHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitHooks").field("hooks", &self.hooks.len()).finish()
    }
}

impl HitHooks {
    pub fn subscribe(
        &mut self,
        hook: impl FnMut(&AfterHit, &mut ProjectileState) + 'static,
    ) -> HookId {
        self.next_id += 1;
        let id = HookId(self.next_id);
        self.hooks.push((id, Box::new(hook)));
        id
    }

    pub fn unsubscribe(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(hook, _)| *hook != id);
        self.hooks.len() != before
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn dispatch(&mut self, hit: &AfterHit, state: &mut ProjectileState) {
        for (_, hook) in &mut self.hooks {
            hook(hit, state);
        }
    }
}
