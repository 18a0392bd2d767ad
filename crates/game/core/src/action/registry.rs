use std::collections::BTreeMap;

use super::kinds::{
    AttackHandler, DeathHandler, EndTurnHandler, MoveHandler, SpawnHandler, StartTurnHandler,
    SurrenderHandler,
};
use super::{ActionHandler, ActionKind};

/// Lookup table from [`ActionKind`] to its handler.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: BTreeMap<ActionKind, Box<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// An empty registry. Every intent is rejected as unregistered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in handler for every kind.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(StartTurnHandler::default()));
        registry.register(Box::new(EndTurnHandler::default()));
        registry.register(Box::new(MoveHandler::default()));
        registry.register(Box::new(AttackHandler::default()));
        registry.register(Box::new(DeathHandler::default()));
        registry.register(Box::new(SpawnHandler::default()));
        registry.register(Box::new(SurrenderHandler::default()));
        registry
    }

    /// Installs `handler` under its kind, returning the one it replaced.
    pub fn register(&mut self, handler: Box<dyn ActionHandler>) -> Option<Box<dyn ActionHandler>> {
        self.handlers.insert(handler.kind(), handler)
    }

    pub fn unregister(&mut self, kind: ActionKind) -> Option<Box<dyn ActionHandler>> {
        self.handlers.remove(&kind)
    }

    pub fn get(&self, kind: ActionKind) -> Option<&dyn ActionHandler> {
        self.handlers.get(&kind).map(|handler| handler.as_ref())
    }

    pub fn get_mut(&mut self, kind: ActionKind) -> Option<&mut (dyn ActionHandler + 'static)> {
        self.handlers.get_mut(&kind).map(|handler| handler.as_mut())
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ActionKind> + '_ {
        self.handlers.keys().copied()
    }
}

impl core::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn standard_registry_covers_every_kind() {
        let registry = ActionRegistry::standard();
        for kind in ActionKind::iter() {
            assert!(registry.contains(kind), "missing handler for {kind}");
            assert_eq!(registry.get(kind).map(|h| h.kind()), Some(kind));
        }
    }
}
