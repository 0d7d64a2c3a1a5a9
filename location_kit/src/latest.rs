use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Identifies a single load started with [`Latest::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Makes sure that out of overlapping loads, only the most recently started one is applied.
/// Results of the ones started before it are thrown away, no matter when they finish.
#[derive(Debug, Clone, Default)]
pub struct Latest {
    generation: Arc<AtomicU64>,
}

impl Latest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, superseding all the previous ones.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Give the `value` back only if no other load was started after the one identified by
    /// `ticket`.
    pub fn resolve<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            log::debug!("Load {ticket:?} was superseded, dropping its result.");
            None
        }
    }
}
