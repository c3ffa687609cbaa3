// SPDX-License-Identifier: MIT OR Apache-2.0
//! Single-threaded broadcast signals.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Signal::connect`], used to disconnect later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw ID value
    pub fn value(&self) -> u64 {
        self.0
    }
}

type Handler<A> = Rc<dyn Fn(&A)>;

/// Synchronous broadcast event with zero or more subscribers.
///
/// Emission works on a snapshot of the subscriber list, so a handler may
/// connect, disconnect or cause further emissions while it runs. A handler
/// disconnected during an emission still receives that emission.
pub struct Signal<A> {
    handlers: RefCell<Vec<(SubscriptionId, Handler<A>)>>,
    next_id: Cell<u64>,
}

impl<A> Signal<A> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Subscribe a handler
    pub fn connect(&self, handler: impl Fn(&A) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Unsubscribe a handler. Returns false if the id was not connected.
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        handlers.len() != before
    }

    /// Invoke every subscriber in connection order
    pub fn emit(&self, arg: &A) {
        let snapshot: Vec<Handler<A>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in snapshot {
            handler(arg);
        }
    }

    /// Number of connected handlers
    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl<A> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
