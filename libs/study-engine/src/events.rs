//! Session notifications and the observer registry.

use crate::types::{ScheduleUpdate, SessionResults, SessionStatus};

/// Something observable happened in the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StatusChanged {
        from: SessionStatus,
        to: SessionStatus,
    },
    ItemRevealed {
        item_id: String,
    },
    ItemAdvanced {
        cursor: usize,
        total: usize,
    },
    ScheduleUpdated(ScheduleUpdate),
    /// `automatic` is true when the last response exhausted the queue.
    SessionCompleted {
        results: SessionResults,
        automatic: bool,
    },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SessionEvent) + Send>;

/// Ordered list of listeners. Listeners run synchronously, in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Observers {
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &SessionEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
