//! Session state store with synchronous change notifications.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use concierge_core::SessionId;
use tracing::{debug, warn};

use super::flags::SessionFlags;
use crate::models::SessionCustomer;

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Holder of the current session customer and UI flags.
///
/// The store is an injected context object: clone it to share it between the
/// orchestrator and the UI. Listeners run synchronously, in registration
/// order, after every change, and always observe the fully updated state.
///
/// The store cannot fail. Poisoned locks are recovered rather than
/// propagated, so the forced-close path can always use it.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    state: RwLock<SessionState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
}

#[derive(Default)]
struct SessionState {
    customer: Option<Arc<SessionCustomer>>,
    flags: SessionFlags,
    /// The live session, if the extension is running one.
    active: Option<SessionId>,
}

impl SessionStore {
    /// Create an empty store with no active session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current aggregate and notify subscribers.
    pub fn set(&self, customer: SessionCustomer) {
        self.write().customer = Some(Arc::new(customer));
        self.notify();
    }

    /// The current aggregate, if any.
    #[must_use]
    pub fn get(&self) -> Option<Arc<SessionCustomer>> {
        self.read().customer.clone()
    }

    /// An owned copy of the current aggregate for a workflow step to edit.
    #[must_use]
    pub fn snapshot(&self) -> Option<SessionCustomer> {
        self.get().map(|customer| (*customer).clone())
    }

    /// Commit an edited snapshot, unless its session has been superseded.
    ///
    /// Returns `false` when the snapshot belongs to a session that is no
    /// longer live; the store is left untouched in that case.
    pub fn commit(&self, customer: SessionCustomer) -> bool {
        {
            let mut state = self.write();
            if state.active != Some(customer.session_id) {
                warn!(
                    session_id = %customer.session_id,
                    "Discarding commit from a superseded session"
                );
                return false;
            }
            state.customer = Some(Arc::new(customer));
        }
        self.notify();
        true
    }

    /// Register a listener called after every change.
    ///
    /// The listener stays registered until [`Subscription::unsubscribe`] is
    /// called; dropping the returned handle does not remove it.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners().push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Current UI flags.
    #[must_use]
    pub fn flags(&self) -> SessionFlags {
        self.read().flags.clone()
    }

    /// Change the UI flags and notify subscribers.
    pub fn update_flags(&self, update: impl FnOnce(&mut SessionFlags)) {
        update(&mut self.write().flags);
        self.notify();
    }

    /// Start a new session around a fresh aggregate.
    ///
    /// Any previous session is superseded: its pending commits are discarded.
    pub fn begin_session(&self, customer: SessionCustomer) {
        {
            let mut state = self.write();
            if let Some(previous) = state.active {
                debug!(previous = %previous, "Superseding running session");
            }
            state.active = Some(customer.session_id);
            state.flags = SessionFlags::starting();
            state.customer = Some(Arc::new(customer));
        }
        self.notify();
    }

    /// Drop the aggregate, reset every flag and end the session.
    pub fn clear_all(&self) {
        {
            let mut state = self.write();
            state.active = None;
            state.customer = None;
            state.flags = SessionFlags::default();
        }
        self.notify();
    }

    /// End the running session after a normal close.
    pub fn end_session(&self) {
        if let Some(session_id) = self.session_id() {
            debug!(session_id = %session_id, "Ending session");
        }
        self.clear_all();
    }

    /// Whether a session is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.read().active.is_some()
    }

    /// The live session, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.read().active
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners().len()
    }

    fn notify(&self) {
        // Listeners may read the store, so no lock is held while they run.
        let listeners: Vec<Listener> = self
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Listener)>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session_id", &self.session_id())
            .field("flags", &self.flags())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    /// Remove this listener. Other listeners are unaffected.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.store.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use concierge_core::Segment;

    use super::*;

    fn customer() -> SessionCustomer {
        SessionCustomer::new(SessionId::generate())
    }

    #[test]
    fn test_get_is_none_before_set() {
        let store = SessionStore::new();
        assert!(store.get().is_none());
        assert!(!store.is_active());
    }

    #[test]
    fn test_set_notifies_in_registration_order() {
        let store = SessionStore::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            let _subscription = store.subscribe(move || order.lock().unwrap().push(tag));
        }

        store.set(customer());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_listener_observes_updated_aggregate() {
        let store = SessionStore::new();
        let seen = Arc::new(Mutex::new(None));

        let reader = store.clone();
        let sink = Arc::clone(&seen);
        let _subscription = store.subscribe(move || {
            *sink.lock().unwrap() = reader.get().map(|c| c.segment.clone());
        });

        let mut updated = customer();
        updated.segment = Segment::new("VIP");
        store.set(updated);

        assert_eq!(*seen.lock().unwrap(), Some(Segment::new("VIP")));
    }

    #[test]
    fn test_unsubscribe_only_removes_one_listener() {
        let store = SessionStore::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&first);
        let first_subscription = store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&second);
        let _second_subscription = store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.set(customer());
        first_subscription.unsubscribe();
        store.set(customer());

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_commit_rejects_superseded_session() {
        let store = SessionStore::new();
        let stale = customer();
        store.begin_session(stale.clone());

        let current = customer();
        store.begin_session(current.clone());

        let mut late = stale;
        late.segment = Segment::new("VIP");
        assert!(!store.commit(late));
        assert_eq!(store.get().unwrap().session_id, current.session_id);

        let mut fresh = current;
        fresh.segment = Segment::new("Loyalty");
        assert!(store.commit(fresh));
        assert_eq!(store.get().unwrap().segment, Segment::new("Loyalty"));
    }

    #[test]
    fn test_begin_and_clear_session() {
        let store = SessionStore::new();
        let customer = customer();
        let id = customer.session_id;

        store.begin_session(customer);
        assert!(store.is_active());
        assert_eq!(store.session_id(), Some(id));
        assert!(store.flags().loading);

        store.update_flags(|flags| flags.raise_error("boom"));
        store.clear_all();
        assert!(!store.is_active());
        assert!(store.get().is_none());
        assert_eq!(store.flags(), SessionFlags::default());
    }
}
