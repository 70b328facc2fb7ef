//! Refresh notification: tells the UI layer to re-read the facade

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Callback invoked on every refresh
pub type RefreshHandler = Arc<dyn Fn() + Send + Sync>;

/// Token returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Fan-out of refresh requests to every subscribed UI component.
///
/// `generation` increases by one per refresh, which lets polling UIs
/// (immediate-mode renderers) detect that something changed.
#[derive(Default)]
pub struct RefreshNotifier {
    handlers: Mutex<Vec<(SubscriptionId, RefreshHandler)>>,
    next_id: AtomicU64,
    generation: AtomicU64,
}

impl RefreshNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn handlers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, RefreshHandler)>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe<F>(&self, cb: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers().push((id, Arc::new(cb)));
        id
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers();
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        handlers.len() != before
    }

    /// Number of refreshes requested so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Request a refresh from every subscriber
    pub fn refresh(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        // Subscribers read the facade, which never touches this lock, but they
        // may subscribe or unsubscribe from inside the callback.
        let handlers: Vec<RefreshHandler> = self.handlers().iter().map(|(_, h)| h.clone()).collect();
        for h in handlers {
            h();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_reaches_subscribers_and_bumps_generation() {
        let n = RefreshNotifier::new();
        let hits = Arc::new(AtomicU64::new(0));
        let h = hits.clone();
        let id = n.subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        n.refresh();
        n.refresh();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(n.generation(), 2);

        assert!(n.unsubscribe(id));
        assert!(!n.unsubscribe(id));
        n.refresh();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(n.generation(), 3);
    }
}
