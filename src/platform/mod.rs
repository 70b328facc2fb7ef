//! Native platform surface: the media element and its document
//!
//! The bridge only observes and forwards calls to these traits. The
//! simulated implementations keep their state in memory and dispatch events
//! the way a browser would, so the bridge can be driven deterministically in
//! tests and in the demo binary.

pub mod document;
pub mod media;
pub mod simulated;

pub use document::{FullscreenOptions, MediaDocument, NavigationUi, NoopDocument, SimulatedDocument};
pub use media::{EventListener, ListenerId, MediaElement, MediaEvent, PictureInPictureWindow};
pub use simulated::SimulatedVideoElement;
