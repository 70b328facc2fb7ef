//! Status classifications derived from the native event stream

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The most recent playback-lifecycle event observed on the element,
/// retained verbatim.
///
/// Before any event arrives the element is considered paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    CanPlay,
    Play,
    Playing,
    #[default]
    Pause,
    Waiting,
    Seeking,
    Seeked,
    Ended,
}

impl VideoStatus {
    pub const ALL: [VideoStatus; 8] = [
        VideoStatus::CanPlay,
        VideoStatus::Play,
        VideoStatus::Playing,
        VideoStatus::Pause,
        VideoStatus::Waiting,
        VideoStatus::Seeking,
        VideoStatus::Seeked,
        VideoStatus::Ended,
    ];

    /// Native event name this status was taken from
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::CanPlay => "canplay",
            VideoStatus::Play => "play",
            VideoStatus::Playing => "playing",
            VideoStatus::Pause => "pause",
            VideoStatus::Waiting => "waiting",
            VideoStatus::Seeking => "seeking",
            VideoStatus::Seeked => "seeked",
            VideoStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown video status '{}'", s))
    }
}

/// Simplified three-way classification for buffering indicators.
///
/// `Waiting` is only reported once the element has stalled for longer than
/// [`crate::projector::WAITING_DEBOUNCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayStatus {
    Playing,
    #[default]
    Paused,
    Waiting,
}

impl PlayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayStatus::Playing => "playing",
            PlayStatus::Paused => "paused",
            PlayStatus::Waiting => "waiting",
        }
    }
}

impl fmt::Display for PlayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
