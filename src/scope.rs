//! Shared element reference and the scope that provides it
//!
//! A [`ControlsScope`] plays the role of the provider: it owns the one
//! [`ElementRef`] every consumer in the scope shares, the status fields and
//! the refresh fan-out. Consumers get a [`VideoControls`] facade through
//! [`ControlsScope::use_video_controls`].

use crate::controls::VideoControls;
use crate::platform::{MediaDocument, MediaElement, NoopDocument};
use crate::projector::{self, Projector};
use crate::refresh::{RefreshNotifier, SubscriptionId};
use crate::UseVideoControlsParams;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mutable slot holding (or not yet holding) the media element.
///
/// Clones share the same slot. Exactly one producer binds it once the
/// element exists; everything else only reads.
#[derive(Clone, Default)]
pub struct ElementRef {
    slot: Arc<Mutex<Option<Arc<dyn MediaElement>>>>,
}

impl ElementRef {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<dyn MediaElement>>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Point the slot at `element`, replacing whatever was there
    pub fn bind(&self, element: Arc<dyn MediaElement>) {
        *self.slot() = Some(element);
    }

    /// Empty the slot (the element was unmounted)
    pub fn clear(&self) {
        *self.slot() = None;
    }

    pub fn get(&self) -> Option<Arc<dyn MediaElement>> {
        self.slot().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.slot().is_some()
    }

    /// Whether both handles share the same slot
    pub fn ptr_eq(&self, other: &ElementRef) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl std::fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef").field("bound", &self.is_bound()).finish()
    }
}

/// State shared by the scope and every facade created from it
pub(crate) struct ScopeShared {
    pub(crate) element: ElementRef,
    pub(crate) document: Arc<dyn MediaDocument>,
    pub(crate) refresh: Arc<RefreshNotifier>,
    pub(crate) projector: Arc<Projector>,
    defaults: Mutex<Option<UseVideoControlsParams>>,
}

impl ScopeShared {
    fn new(document: Arc<dyn MediaDocument>) -> Self {
        let refresh = Arc::new(RefreshNotifier::new());
        let projector = Arc::new(Projector::new(refresh.clone()));
        ScopeShared {
            element: ElementRef::new(),
            document,
            refresh,
            projector,
            defaults: Mutex::new(None),
        }
    }

    /// Shared state for a consumer with no provider above it
    pub(crate) fn detached() -> Self {
        Self::new(Arc::new(NoopDocument::new()))
    }

    /// Keep the first defaults offered; later ones are ignored
    pub(crate) fn offer_defaults(&self, params: &UseVideoControlsParams) {
        self.defaults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_or_insert_with(|| params.clone());
    }

    /// Register listeners on the bound element, see [`ControlsScope::mount`]
    pub(crate) fn mount(&self) -> bool {
        let projector = &self.projector;
        let Some(element) = self.element.get() else {
            if projector.mounted_element().is_some() {
                debug!("element was cleared, removing listeners");
                projector.teardown();
            }
            projector::warn_unbound();
            return false;
        };

        let defaults = self
            .defaults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_default();
        projector.setup_if_changed(element, &defaults);
        true
    }
}

/// Provider of one shared element reference and its status fields.
///
/// Listener setup happens once per element identity no matter how many
/// consumers call [`ControlsScope::use_video_controls`]. Dropping the scope
/// removes every listener and cancels the pending buffering timer.
pub struct ControlsScope {
    shared: Arc<ScopeShared>,
}

impl ControlsScope {
    /// Create a scope whose exit operations go to `document`.
    ///
    /// Buffering timers run on the tokio runtime current wherever the
    /// `waiting` event is observed, or on a timer thread outside one.
    pub fn new(document: Arc<dyn MediaDocument>) -> Self {
        ControlsScope {
            shared: Arc::new(ScopeShared::new(document)),
        }
    }

    /// The shared element reference (the same slot for every call)
    pub fn element_ref(&self) -> ElementRef {
        self.shared.element.clone()
    }

    pub fn document(&self) -> Arc<dyn MediaDocument> {
        self.shared.document.clone()
    }

    /// Obtain a facade and the shared element reference.
    ///
    /// The first consumer's defaults are the ones applied to the element on
    /// mount; each facade still falls back to its own defaults while unbound.
    pub fn use_video_controls(&self, params: UseVideoControlsParams) -> (VideoControls, ElementRef) {
        self.shared.offer_defaults(&params);
        let controls = VideoControls::new(self.shared.clone(), params);
        self.mount();
        (controls, self.element_ref())
    }

    /// Register listeners on the bound element.
    ///
    /// Does nothing if listeners are already registered on this exact
    /// element; tears down the old registration if the element changed.
    /// Concurrent calls are serialized. Returns whether an element is
    /// mounted afterwards.
    pub fn mount(&self) -> bool {
        self.shared.mount()
    }

    /// Remove every listener and cancel the buffering timer
    pub fn unmount(&self) {
        self.shared.projector.teardown();
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.projector.mounted_element().is_some()
    }

    /// Be notified on every refresh
    pub fn subscribe<F>(&self, cb: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.refresh.subscribe(cb)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.refresh.unsubscribe(id)
    }

    /// Number of refreshes requested in this scope so far
    pub fn refresh_generation(&self) -> u64 {
        self.shared.refresh.generation()
    }
}

impl Default for ControlsScope {
    fn default() -> Self {
        Self::new(Arc::new(NoopDocument::new()))
    }
}

impl Drop for ControlsScope {
    fn drop(&mut self) {
        self.shared.projector.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MediaEvent, SimulatedVideoElement};

    #[test]
    fn element_ref_clones_share_one_slot() {
        let r = ElementRef::new();
        let other = r.clone();
        assert!(!other.is_bound());
        r.bind(Arc::new(SimulatedVideoElement::new()));
        assert!(other.is_bound());
        assert!(r.ptr_eq(&other));
        other.clear();
        assert!(r.get().is_none());
    }

    #[test]
    fn mount_is_idempotent_per_element() {
        let scope = ControlsScope::default();
        let el = Arc::new(SimulatedVideoElement::new());
        scope.element_ref().bind(el.clone());
        assert!(scope.mount());
        assert!(scope.mount());
        assert_eq!(el.listener_count(), MediaEvent::ALL.len());
    }

    #[test]
    fn new_element_identity_moves_listeners() {
        let scope = ControlsScope::default();
        let first = Arc::new(SimulatedVideoElement::new());
        let second = Arc::new(SimulatedVideoElement::new());
        scope.element_ref().bind(first.clone());
        scope.mount();
        scope.element_ref().bind(second.clone());
        scope.mount();
        assert_eq!(first.listener_count(), 0);
        assert_eq!(second.listener_count(), MediaEvent::ALL.len());
    }

    #[test]
    fn mount_without_element_is_not_fatal() {
        let scope = ControlsScope::default();
        assert!(!scope.mount());
        assert!(!scope.is_mounted());
    }

    #[test]
    fn concurrent_mounts_register_one_listener_set() {
        let scope = Arc::new(ControlsScope::default());
        let el = Arc::new(SimulatedVideoElement::new());
        scope.element_ref().bind(el.clone());
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let scope = scope.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    scope.mount()
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().expect("mount thread panicked"));
        }
        assert_eq!(el.listener_count(), MediaEvent::ALL.len());

        scope.unmount();
        assert_eq!(el.listener_count(), 0);
    }

    #[test]
    fn dropping_the_scope_removes_listeners() {
        let el = Arc::new(SimulatedVideoElement::new());
        {
            let scope = ControlsScope::default();
            scope.element_ref().bind(el.clone());
            scope.mount();
            assert!(el.listener_count() > 0);
        }
        assert_eq!(el.listener_count(), 0);
    }
}
