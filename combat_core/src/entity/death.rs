//! Death notification boundary

use crate::types::{EntityId, Position, SimTime};
use std::cell::RefCell;
use std::rc::Rc;

/// Raised exactly once per life when an entity's HP reaches zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathEvent {
    pub entity: EntityId,
    pub killer: Option<EntityId>,
    pub position: Position,
    pub time: SimTime,
}

/// Consumer of death events (loot, respawn bookkeeping, UI, ...)
pub trait DeathListener {
    fn on_death(&mut self, event: &DeathEvent);
}

impl<F: FnMut(&DeathEvent)> DeathListener for F {
    fn on_death(&mut self, event: &DeathEvent) {
        self(event)
    }
}

/// Handle returned by [`DeathBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Ordered observer list; listeners are notified in subscription order
#[derive(Default)]
pub struct DeathBus {
    listeners: Vec<(ListenerId, Box<dyn DeathListener>)>,
    next_id: u32,
}

impl DeathBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn DeathListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    pub fn publish(&mut self, event: &DeathEvent) {
        for (_, listener) in &mut self.listeners {
            listener.on_death(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for DeathBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeathBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Listener that records every event; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct DeathLog {
    events: Rc<RefCell<Vec<DeathEvent>>>,
}

impl DeathLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DeathEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl DeathListener for DeathLog {
    fn on_death(&mut self, event: &DeathEvent) {
        self.events.borrow_mut().push(*event);
    }
}
