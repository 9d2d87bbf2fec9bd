//! Typed per-node publish/subscribe.
//!
//! One hub per event kind per node replaces the per-event-name callback
//! fields the widget wrappers used to overwrite on each other. The scroll
//! translator and the directional mirror subscribe instead of clobbering a
//! shared field.
//!
//! Hubs are single-threaded by construction (`Rc`); all emission happens on
//! the UI-owning thread.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

// =============================================================================
// Hub
// =============================================================================

struct HubInner<T> {
    next_id: u64,
    subscribers: Vec<(u64, Box<dyn FnMut(&T)>)>,
    /// Ids unsubscribed while an emit was in progress.
    tombstones: Vec<u64>,
}

/// A typed event hub with stable unsubscribe handles.
pub struct EventHub<T> {
    inner: Rc<RefCell<HubInner<T>>>,
}

impl<T> Default for EventHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for EventHub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl<T> EventHub<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HubInner {
                next_id: 0,
                subscribers: Vec::new(),
                tombstones: Vec::new(),
            })),
        }
    }

    /// Register a consumer. The returned [`Subscription`] detaches it again.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription<T> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        Subscription {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// True when nothing is listening. High-frequency producers check this
    /// before doing any event computation.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().subscribers.is_empty()
    }

    /// Deliver an event to every subscriber.
    ///
    /// Subscribing or unsubscribing from inside a callback is allowed; new
    /// subscribers do not see the event currently being delivered.
    pub fn emit(&self, event: &T) {
        // Detach the subscriber list so callbacks may re-borrow the hub.
        let mut active = std::mem::take(&mut self.inner.borrow_mut().subscribers);
        for (_, callback) in active.iter_mut() {
            callback(event);
        }

        let mut inner = self.inner.borrow_mut();
        let added = std::mem::take(&mut inner.subscribers);
        inner.subscribers = active;
        inner.subscribers.extend(added);
        if !inner.tombstones.is_empty() {
            let tombstones = std::mem::take(&mut inner.tombstones);
            inner
                .subscribers
                .retain(|(id, _)| !tombstones.contains(id));
        }
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Handle returned by [`EventHub::subscribe`].
///
/// Dropping the handle keeps the subscription alive; consumers detach
/// explicitly via [`Subscription::unsubscribe`].
pub struct Subscription<T> {
    hub: Weak<RefCell<HubInner<T>>>,
    id: u64,
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl<T> Subscription<T> {
    /// Detach the consumer. Safe to call after the hub is gone, and safe to
    /// call from inside an event callback.
    pub fn unsubscribe(self) {
        let Some(inner) = self.hub.upgrade() else {
            return;
        };
        let mut inner = inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(id, _)| *id != self.id);
        if inner.subscribers.len() == before {
            // Mid-emit: the list is detached. Leave a tombstone.
            inner.tombstones.push(self.id);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
