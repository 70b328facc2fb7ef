//! Native media element surface consumed by the bridge

use crate::status::VideoStatus;
use crate::Result;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::document::FullscreenOptions;

/// Native events the bridge listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    CanPlay,
    Play,
    Playing,
    Pause,
    Waiting,
    Seeking,
    Seeked,
    Ended,
    TimeUpdate,
    DurationChange,
    VolumeChange,
    RateChange,
}

impl MediaEvent {
    pub const ALL: [MediaEvent; 12] = [
        MediaEvent::CanPlay,
        MediaEvent::Play,
        MediaEvent::Playing,
        MediaEvent::Pause,
        MediaEvent::Waiting,
        MediaEvent::Seeking,
        MediaEvent::Seeked,
        MediaEvent::Ended,
        MediaEvent::TimeUpdate,
        MediaEvent::DurationChange,
        MediaEvent::VolumeChange,
        MediaEvent::RateChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaEvent::CanPlay => "canplay",
            MediaEvent::Play => "play",
            MediaEvent::Playing => "playing",
            MediaEvent::Pause => "pause",
            MediaEvent::Waiting => "waiting",
            MediaEvent::Seeking => "seeking",
            MediaEvent::Seeked => "seeked",
            MediaEvent::Ended => "ended",
            MediaEvent::TimeUpdate => "timeupdate",
            MediaEvent::DurationChange => "durationchange",
            MediaEvent::VolumeChange => "volumechange",
            MediaEvent::RateChange => "ratechange",
        }
    }

    /// The raw status this event defines, if it is a lifecycle event
    pub fn status(&self) -> Option<VideoStatus> {
        match self {
            MediaEvent::CanPlay => Some(VideoStatus::CanPlay),
            MediaEvent::Play => Some(VideoStatus::Play),
            MediaEvent::Playing => Some(VideoStatus::Playing),
            MediaEvent::Pause => Some(VideoStatus::Pause),
            MediaEvent::Waiting => Some(VideoStatus::Waiting),
            MediaEvent::Seeking => Some(VideoStatus::Seeking),
            MediaEvent::Seeked => Some(VideoStatus::Seeked),
            MediaEvent::Ended => Some(VideoStatus::Ended),
            MediaEvent::TimeUpdate
            | MediaEvent::DurationChange
            | MediaEvent::VolumeChange
            | MediaEvent::RateChange => None,
        }
    }
}

impl fmt::Display for MediaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaEvent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        MediaEvent::ALL
            .into_iter()
            .find(|ev| ev.as_str() == s)
            .ok_or_else(|| format!("unknown media event '{}'", s))
    }
}

/// Callback invoked when a native event fires
pub type EventListener = Arc<dyn Fn(MediaEvent) + Send + Sync>;

/// Token returned by `add_event_listener`, used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Picture-in-Picture window handed back by the element
#[derive(Debug, Clone, PartialEq)]
pub struct PictureInPictureWindow {
    pub width: u32,
    pub height: u32,
}

/// The stateful playback element.
///
/// Implementations are expected to follow standard media element semantics:
/// property writes take effect immediately and the matching change events
/// (`volumechange`, `ratechange`, `seeking`/`seeked`, ...) are dispatched to
/// registered listeners.
pub trait MediaElement: Send + Sync {
    /// Playback position in seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);

    /// Media duration in seconds (NaN until metadata is known)
    fn duration(&self) -> f64;

    fn paused(&self) -> bool;

    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);

    /// Volume in the range 0..=1
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);

    fn looping(&self) -> bool;
    fn set_looping(&self, looping: bool);

    /// Start playback. Rejected by autoplay policy or missing media.
    fn play(&self) -> Result<()>;
    fn pause(&self);

    fn request_picture_in_picture(&self) -> Result<PictureInPictureWindow>;
    fn request_fullscreen(&self, options: Option<FullscreenOptions>) -> Result<()>;

    /// Register a listener for one event type
    fn add_event_listener(&self, event: MediaEvent, listener: EventListener) -> ListenerId;

    /// Remove a previously registered listener (unknown ids are ignored)
    fn remove_event_listener(&self, event: MediaEvent, id: ListenerId);
}
