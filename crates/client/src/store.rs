//! Single-writer state containers.
//!
//! A [`Store`] holds an immutable snapshot of some state. The only way to
//! change it is [`Store::dispatch`], which reduces an action against the
//! current snapshot, swaps in the result, then calls every listener in
//! subscription order. Listeners run synchronously on the dispatching thread
//! after the state lock is released, so a listener may read the store or
//! dispatch again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// State that evolves by reducing actions.
pub trait Reducer: Clone + Default + Send + Sync + 'static {
    /// The actions this state understands.
    type Action;

    /// Apply one action.
    fn reduce(&mut self, action: Self::Action);
}

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// A state container with ordered synchronous listeners.
pub struct Store<S: Reducer> {
    state: Mutex<Arc<S>>,
    listeners: Mutex<Vec<(Subscription, Listener<S>)>>,
    next_id: AtomicU64,
}

impl<S: Reducer> Default for Store<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Reducer> Store<S> {
    /// A store holding `S::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Arc::new(S::default())),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&lock(&self.state))
    }

    /// Reduce `action` into a new snapshot and notify listeners.
    ///
    /// Concurrent dispatches are applied one at a time.
    pub fn dispatch(&self, action: S::Action) {
        let next = {
            let mut current = lock(&self.state);
            let mut next = S::clone(&current);
            next.reduce(action);
            let next = Arc::new(next);
            *current = Arc::clone(&next);
            next
        };

        let listeners: Vec<Listener<S>> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&next);
        }
    }

    /// Register a listener called after every dispatch.
    pub fn subscribe(&self, listener: impl Fn(&S) + Send + Sync + 'static) -> Subscription {
        let id = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }
}

/// Lock ignoring poisoning; snapshots are replaced whole, never half-written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
