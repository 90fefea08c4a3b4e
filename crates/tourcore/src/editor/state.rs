use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::session::EditSession;
use crate::content::{ExcursionId, PointId};

/// Everything the bot remembers about one admin's conversation.
#[derive(Debug, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    Editing(Box<EditSession>),
    /// Waiting for the new order of the points listed in `shown`.
    ChangingOrder {
        excursion_id: ExcursionId,
        shown: Vec<PointId>,
    },
}

impl ConversationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle)
    }
}

pub type StateSlot = Arc<Mutex<ConversationState>>;

/// Per-user conversation states. Holding a user's slot lock serialises that
/// user's events; different users never wait on each other.
#[derive(Debug, Default)]
pub struct StateRegistry {
    slots: DashMap<i64, StateSlot>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's slot, created idle on first use. Only flows that are about
    /// to leave `Idle` create slots.
    pub fn slot(&self, user_id: i64) -> StateSlot {
        self.slots.entry(user_id).or_default().clone()
    }

    /// The user's slot if one exists; a missing slot means `Idle`.
    pub fn existing(&self, user_id: i64) -> Option<StateSlot> {
        self.slots.get(&user_id).map(|slot| Arc::clone(slot.value()))
    }

    /// Drops the user's slot once it is idle and nobody else holds it.
    pub fn prune(&self, user_id: i64) {
        self.slots.remove_if(&user_id, |_, slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|state| state.is_idle())
        });
    }

    pub(crate) fn contains(&self, user_id: i64) -> bool {
        self.slots.contains_key(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slots_are_shared_per_user() {
        let registry = StateRegistry::new();

        {
            let slot = registry.slot(7);
            let mut state = slot.lock().await;
            *state = ConversationState::ChangingOrder {
                excursion_id: ExcursionId(1),
                shown: vec![PointId(1)],
            };
        }

        assert!(!registry.slot(7).lock().await.is_idle());
        assert!(registry.existing(8).is_none());
        assert!(!registry.contains(8));
    }

    #[tokio::test]
    async fn idle_slots_are_pruned_once_released() {
        let registry = StateRegistry::new();
        let slot = registry.slot(7);

        registry.prune(7);
        assert!(registry.contains(7), "a slot still in use must survive");

        drop(slot);
        registry.prune(7);
        assert!(!registry.contains(7));
    }

    #[tokio::test]
    async fn active_slots_are_kept() {
        let registry = StateRegistry::new();
        *registry.slot(7).lock().await = ConversationState::ChangingOrder {
            excursion_id: ExcursionId(1),
            shown: Vec::new(),
        };

        registry.prune(7);

        assert!(registry.contains(7));
    }
}
