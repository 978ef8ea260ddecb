//! Listener lists for push notifications

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle for removing a subscribed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

/// Ordered set of listeners for events of type `E`.
///
/// Emission works on a snapshot, so listeners may subscribe or unsubscribe
/// while being notified. A listener added during an emission first hears
/// the next one; a listener removed during an emission hears nothing more.
pub struct Listeners<E> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(ListenerId, Listener<E>)>>,
}

impl<E> Listeners<E> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Add a listener.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&E) + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Deliver `event` to every listener, in subscription order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<(ListenerId, Listener<E>)> = self
            .entries
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();
        for (id, listener) in snapshot {
            if self.contains(id) {
                listener(event);
            }
        }
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Number of subscribed listeners
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if nobody is listening
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listeners({})", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let listeners: Listeners<u32> = Listeners::new();
        let (a, b) = (Rc::clone(&seen), Rc::clone(&seen));
        listeners.subscribe(move |e| a.borrow_mut().push(("a", *e)));
        listeners.subscribe(move |e| b.borrow_mut().push(("b", *e)));

        listeners.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let listeners: Listeners<()> = Listeners::new();
        let id = listeners.subscribe(|_| {});
        assert_eq!(listeners.len(), 1);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_subscribe_during_emit() {
        let listeners: Rc<Listeners<()>> = Rc::new(Listeners::new());
        let inner = Rc::downgrade(&listeners);
        listeners.subscribe(move |_| {
            if let Some(l) = inner.upgrade() {
                l.subscribe(|_| {});
            }
        });
        listeners.emit(&());
        assert_eq!(listeners.len(), 2);
    }

    #[test]
    fn test_unsubscribe_during_emit_skips_removed_listener() {
        let listeners: Rc<Listeners<()>> = Rc::new(Listeners::new());
        let later = Rc::new(Cell::new(None));
        let hits = Rc::new(Cell::new(0));

        let inner = Rc::downgrade(&listeners);
        let target = Rc::clone(&later);
        listeners.subscribe(move |_| {
            if let (Some(l), Some(id)) = (inner.upgrade(), target.get()) {
                l.unsubscribe(id);
            }
        });
        let sink = Rc::clone(&hits);
        later.set(Some(listeners.subscribe(move |_| sink.set(sink.get() + 1))));

        listeners.emit(&());
        assert_eq!(hits.get(), 0);
        assert_eq!(listeners.len(), 1);
    }
}
