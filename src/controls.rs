//! Control facade over the live media element

use crate::platform::{FullscreenOptions, MediaElement, PictureInPictureWindow};
use crate::scope::{ElementRef, ScopeShared};
use crate::status::{PlayStatus, VideoStatus};
use crate::{Result, UseVideoControlsParams};
use std::sync::Arc;

struct ControlsInner {
    shared: Arc<ScopeShared>,
    defaults: UseVideoControlsParams,
}

/// Readable/writable view of the media element.
///
/// The facade caches nothing: every getter reads the element at call time,
/// falling back to the configured defaults while no element is bound, and
/// every setter writes straight through. Writes and actions on an unbound
/// element do nothing. Cloning is cheap and keeps the same identity.
#[derive(Clone)]
pub struct VideoControls {
    inner: Arc<ControlsInner>,
}

impl VideoControls {
    pub(crate) fn new(shared: Arc<ScopeShared>, defaults: UseVideoControlsParams) -> Self {
        VideoControls {
            inner: Arc::new(ControlsInner { shared, defaults }),
        }
    }

    fn shared(&self) -> &ScopeShared {
        &self.inner.shared
    }

    fn refresh(&self) {
        self.shared().refresh.refresh();
    }

    /// The currently bound element, if any
    pub fn element(&self) -> Option<Arc<dyn MediaElement>> {
        self.shared().element.get()
    }

    /// The shared element reference this facade reads through
    pub fn element_ref(&self) -> ElementRef {
        self.shared().element.clone()
    }

    /// Defaults this facade was created with
    pub fn defaults(&self) -> &UseVideoControlsParams {
        &self.inner.defaults
    }

    /// Whether two facades are the same instance
    pub fn ptr_eq(&self, other: &VideoControls) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register listeners on the bound element for this facade's scope.
    ///
    /// Same as [`crate::ControlsScope::mount`]; a facade obtained without a
    /// provider has no other way to be set up.
    pub fn mount(&self) -> bool {
        self.shared().mount()
    }

    /// Remove the scope's listeners and cancel its buffering timer
    pub fn unmount(&self) {
        self.shared().projector.teardown();
    }

    pub fn is_mounted(&self) -> bool {
        self.shared().projector.mounted_element().is_some()
    }

    pub fn current_time(&self) -> f64 {
        self.element().map_or(0.0, |el| el.current_time())
    }

    pub fn set_current_time(&self, seconds: f64) {
        if let Some(el) = self.element() {
            el.set_current_time(seconds);
        }
    }

    pub fn muted(&self) -> bool {
        self.element().map_or(self.inner.defaults.default_mute, |el| el.muted())
    }

    /// Set the mute flag and refresh, since the UI may not otherwise see it
    pub fn set_muted(&self, muted: bool) {
        if let Some(el) = self.element() {
            el.set_muted(muted);
            self.refresh();
        }
    }

    pub fn volume(&self) -> f64 {
        self.element().map_or(self.inner.defaults.default_volume, |el| el.volume())
    }

    /// Set the volume. A volume of exactly zero also mutes; any other volume unmutes.
    pub fn set_volume(&self, volume: f64) {
        if let Some(el) = self.element() {
            el.set_muted(volume == 0.0);
            el.set_volume(volume);
            self.refresh();
        }
    }

    pub fn playback_rate(&self) -> f64 {
        self.element()
            .map_or(self.inner.defaults.default_play_rate, |el| el.playback_rate())
    }

    pub fn set_playback_rate(&self, rate: f64) {
        if let Some(el) = self.element() {
            el.set_playback_rate(rate);
        }
    }

    pub fn looping(&self) -> bool {
        self.element().map_or(self.inner.defaults.default_loop, |el| el.looping())
    }

    /// Set the loop flag and refresh; the element fires no event for it
    pub fn set_looping(&self, looping: bool) {
        if let Some(el) = self.element() {
            el.set_looping(looping);
            self.refresh();
        }
    }

    pub fn duration(&self) -> f64 {
        self.element().map_or(0.0, |el| el.duration())
    }

    pub fn paused(&self) -> bool {
        self.element().is_some_and(|el| el.paused())
    }

    /// Most recent lifecycle event name
    pub fn status(&self) -> VideoStatus {
        self.shared().projector.status()
    }

    /// Debounced playing/paused/waiting classification
    pub fn play_status(&self) -> PlayStatus {
        self.shared().projector.play_status()
    }

    /// Start playback; rejections from the element are passed through
    pub fn play(&self) -> Result<()> {
        match self.element() {
            Some(el) => el.play(),
            None => Ok(()),
        }
    }

    pub fn pause(&self) {
        if let Some(el) = self.element() {
            el.pause();
        }
    }

    /// `Ok(None)` when no element is bound
    pub fn request_picture_in_picture(&self) -> Result<Option<PictureInPictureWindow>> {
        self.element()
            .map(|el| el.request_picture_in_picture())
            .transpose()
    }

    /// Leave picture-in-picture. Document-wide, so it works without an element.
    pub fn exit_picture_in_picture(&self) -> Result<()> {
        self.shared().document.exit_picture_in_picture()
    }

    pub fn request_fullscreen(&self, options: Option<FullscreenOptions>) -> Result<()> {
        match self.element() {
            Some(el) => el.request_fullscreen(options),
            None => Ok(()),
        }
    }

    /// Leave fullscreen. Document-wide, so it works without an element.
    pub fn exit_fullscreen(&self) -> Result<()> {
        self.shared().document.exit_fullscreen()
    }
}

impl std::fmt::Debug for VideoControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoControls")
            .field("bound", &self.element().is_some())
            .field("status", &self.status())
            .field("play_status", &self.play_status())
            .finish()
    }
}
