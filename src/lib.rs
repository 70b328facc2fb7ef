//! Video Controls
//!
//! A reactive control surface over a stateful media playback element. UI
//! components observe and mutate playback state (time, volume, rate, loop,
//! mute, picture-in-picture, fullscreen) through one facade instead of
//! wiring native event listeners themselves.
//!
//! # Features
//!
//! - **Live facade**: getters read the element at call time, setters write
//!   straight through and request a UI refresh where needed
//! - **Derived statuses**: the last lifecycle event verbatim, plus a debounced
//!   playing/paused/waiting classification for buffering indicators
//! - **One element, many consumers**: every consumer in a [`ControlsScope`]
//!   shares the same element reference, statuses and listener registration
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use video_controls::{ControlsScope, UseVideoControlsParams};
//! use video_controls::platform::SimulatedVideoElement;
//!
//! let scope = ControlsScope::default();
//! let (controls, element_ref) = scope.use_video_controls(UseVideoControlsParams {
//!     default_volume: 0.5,
//!     ..Default::default()
//! });
//!
//! element_ref.bind(Arc::new(SimulatedVideoElement::new()));
//! scope.mount();
//!
//! controls.play().unwrap();
//! assert_eq!(controls.status().as_str(), "playing");
//! assert_eq!(controls.volume(), 0.5);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod controls;
pub mod error;
pub mod platform;
pub mod projector;
pub mod refresh;
pub mod scope;
pub mod status;

pub use controls::VideoControls;
pub use error::{Error, Result};
pub use projector::WAITING_DEBOUNCE;
pub use refresh::SubscriptionId;
pub use scope::{ControlsScope, ElementRef};
pub use status::{PlayStatus, VideoStatus};

/// Defaults applied to the element when it mounts, and reported by the
/// facade while no element is bound.
///
/// Deserializes from camelCase keys (`defaultMute`, `defaultVolume`,
/// `defaultPlayRate`, `defaultLoop`); missing keys take their defaults.
///
/// # Examples
///
/// ```
/// let p = video_controls::UseVideoControlsParams::from_json(r#"{"defaultVolume": 0.25}"#).unwrap();
/// assert_eq!(p.default_volume, 0.25);
/// assert!(!p.default_mute);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UseVideoControlsParams {
    /// Start muted
    pub default_mute: bool,
    /// Initial volume in 0..=1
    pub default_volume: f64,
    /// Initial playback rate
    pub default_play_rate: f64,
    /// Start with looping enabled
    pub default_loop: bool,
}

impl Default for UseVideoControlsParams {
    fn default() -> Self {
        Self {
            default_mute: false,
            default_volume: 1.0,
            default_play_rate: 1.0,
            default_loop: false,
        }
    }
}

impl UseVideoControlsParams {
    /// Reject values the element could not accept
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(Error::ConfigError(format!(
                "defaultVolume must be within 0..=1, got {}",
                self.default_volume
            )));
        }
        if !self.default_play_rate.is_finite() || self.default_play_rate <= 0.0 {
            return Err(Error::ConfigError(format!(
                "defaultPlayRate must be a positive number, got {}",
                self.default_play_rate
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON params object
    pub fn from_json(s: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }
}

/// Obtain a facade and element reference, optionally from a provider.
///
/// Without a scope the facade gets a private one of its own: every read
/// reports the defaults and every write is a no-op until something binds the
/// returned reference and calls [`VideoControls::mount`]. The private scope
/// is torn down when the last clone of the facade is dropped.
pub fn use_video_controls(
    scope: Option<&ControlsScope>,
    params: UseVideoControlsParams,
) -> (VideoControls, ElementRef) {
    match scope {
        Some(scope) => scope.use_video_controls(params),
        None => {
            projector::warn_unbound();
            let shared = Arc::new(scope::ScopeShared::detached());
            shared.offer_defaults(&params);
            let element_ref = shared.element.clone();
            (VideoControls::new(shared, params), element_ref)
        }
    }
}
