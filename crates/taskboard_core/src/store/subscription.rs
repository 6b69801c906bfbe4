//! Explicit observer registry used by both stores.

use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Ids are unique across every registry in the process, so a handle can
/// never remove another store's listener.
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener<S> = Box<dyn FnMut(&S)>;

/// Ordered list of state-change listeners.
pub struct Subscribers<S> {
    listeners: Vec<(SubscriptionId, Listener<S>)>,
}

impl<S> Default for Subscribers<S> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<S> Debug for Subscribers<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.listeners.len())
            .finish()
    }
}

impl<S> Subscribers<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&S) + 'static,
    {
        let id = SubscriptionId(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed));
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Calls every listener in subscription order.
    pub fn notify(&mut self, state: &S) {
        for (_, listener) in &mut self.listeners {
            listener(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Subscribers;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notifies_in_order_and_unsubscribes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::<u32>::new();

        let first_seen = Rc::clone(&seen);
        let first = subscribers.subscribe(move |value| first_seen.borrow_mut().push(("a", *value)));
        let second_seen = Rc::clone(&seen);
        subscribers.subscribe(move |value| second_seen.borrow_mut().push(("b", *value)));

        subscribers.notify(&1);
        assert!(subscribers.unsubscribe(first));
        assert!(!subscribers.unsubscribe(first));
        subscribers.notify(&2);

        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
    }

    #[test]
    fn ids_from_separate_registries_never_collide() {
        let mut first = Subscribers::<u32>::new();
        let mut second = Subscribers::<u32>::new();
        let id = first.subscribe(|_| {});
        second.subscribe(|_| {});

        assert!(!second.unsubscribe(id));
        assert!(first.unsubscribe(id));
    }
}
