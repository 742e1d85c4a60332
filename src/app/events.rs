//! Status subscription and notification
//!
//! [`StatusBus`] fans every `(status, progress)` change out to subscribers,
//! synchronously and in subscription order, before control returns to the
//! caller that performed the mutation. A new subscriber immediately receives
//! the current state (replay-on-subscribe), so a late subscriber is never
//! blind to where the lifecycle stands.

use std::sync::{Arc, Mutex, Weak};

use tracing::trace;

use super::status::StatusUpdate;

/// Callback invoked with each status observation
pub type StatusCallback = Arc<dyn Fn(&StatusUpdate) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: StatusCallback,
}

struct BusInner {
    current: StatusUpdate,
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

/// Synchronous publish/subscribe channel for loader status
///
/// Callbacks are fire-and-forget: the bus does not await their completion and
/// does not isolate one callback's behavior from another's. Delivery order is
/// registration order. Callbacks run outside the bus lock, so a callback may
/// call back into the bus (subscribe, query, or detach) without deadlocking.
#[derive(Clone)]
pub struct StatusBus {
    inner: Arc<Mutex<BusInner>>,
}

impl StatusBus {
    /// Create a bus holding the loader's initial state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusInner {
                current: StatusUpdate::initial(),
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a callback and immediately replay the current state to it
    ///
    /// The returned [`Subscription`] detaches the callback when dropped, or
    /// earlier via [`Subscription::unsubscribe`].
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StatusUpdate) + Send + Sync + 'static,
    {
        let callback: StatusCallback = Arc::new(callback);

        // Replay outside the lock, before registering, so the callback is
        // free to call back into the bus during the replay.
        let replayed = self.current();
        callback(&replayed);

        let mut inner = self.inner.lock().expect("status bus lock poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        // A publish may have raced in between the replay and registration;
        // deliver the newer state so the subscriber does not start stale.
        if inner.current != replayed {
            let current = inner.current.clone();
            callback(&current);
        }
        inner.subscribers.push(Subscriber { id, callback });

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Publish a new observation to every subscriber, in order
    ///
    /// The subscriber list is snapshotted under the lock and callbacks are
    /// invoked after it is released.
    pub fn publish(&self, update: StatusUpdate) {
        let callbacks: Vec<StatusCallback> = {
            let mut inner = self.inner.lock().expect("status bus lock poisoned");
            trace!(status = %update.status, progress = update.progress, "status update");
            inner.current = update.clone();
            inner.subscribers.iter().map(|s| s.callback.clone()).collect()
        };
        for callback in callbacks {
            callback(&update);
        }
    }

    /// The most recently published observation
    pub fn current(&self) -> StatusUpdate {
        self.inner
            .lock()
            .expect("status bus lock poisoned")
            .current
            .clone()
    }

    /// Number of attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .expect("status bus lock poisoned")
            .subscribers
            .len()
    }
}

impl Default for StatusBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered status callback
///
/// Dropping the handle detaches the callback from the bus.
pub struct Subscription {
    id: u64,
    bus: Weak<Mutex<BusInner>>,
}

impl Subscription {
    /// Detach the callback explicitly
    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    fn detach(&self) {
        if let Some(inner) = self.bus.upgrade() {
            let mut inner = inner.lock().expect("status bus lock poisoned");
            inner.subscribers.retain(|s| s.id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
