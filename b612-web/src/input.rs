use std::collections::HashMap;

use crate::scene::EntityId;

/// Where an interaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Mouse / touch click.
    Pointer,
    /// VR controller trigger-down.
    VrTrigger,
    /// Synthesized by a fallback timer.
    AutoTimer,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pointer => "click",
            Self::VrTrigger => "triggerdown",
            Self::AutoTimer => "auto-timer",
        }
    }
}

/// The canonical "this entity was interacted with" signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionSignal {
    pub target: EntityId,
    pub source: SourceKind,
    pub at: u64,
}

struct Cooldown {
    window: u64,
    last_accepted: Option<u64>,
}

/// Turns raw pointer/trigger input into canonical signals, at most one per
/// cooldown window per entity.
#[derive(Default)]
pub struct InteractionDispatcher {
    cooldowns: HashMap<EntityId, Cooldown>,
}

impl InteractionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening on `target` with a cooldown of `window` ms.
    pub fn register(&mut self, target: EntityId, window: u64) {
        log::debug!("Listening for interactions on {target} ({window} ms window)");
        self.cooldowns.insert(
            target,
            Cooldown {
                window,
                last_accepted: None,
            },
        );
    }

    pub fn is_registered(&self, target: &EntityId) -> bool {
        self.cooldowns.contains_key(target)
    }

    /// Feed one raw input. Returns the canonical signal if it was accepted.
    pub fn raw(
        &mut self,
        target: &EntityId,
        source: SourceKind,
        now: u64,
    ) -> Option<InteractionSignal> {
        let Some(cooldown) = self.cooldowns.get_mut(target) else {
            log::debug!("Ignoring {} on unregistered entity {target}", source.label());
            return None;
        };
        if let Some(last) = cooldown.last_accepted {
            if now.saturating_sub(last) < cooldown.window {
                log::debug!("Ignoring {} on {target}: cooling down", source.label());
                return None;
            }
        }
        cooldown.last_accepted = Some(now);
        log::info!("Interaction on {target} via {}", source.label());
        Some(InteractionSignal {
            target: target.clone(),
            source,
            at: now,
        })
    }

    /// Signal raised by a timer on behalf of `target`. Not debounced.
    pub fn synthetic(target: EntityId, now: u64) -> InteractionSignal {
        InteractionSignal {
            target,
            source: SourceKind::AutoTimer,
            at: now,
        }
    }
}
