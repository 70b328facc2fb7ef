//! In-memory video element for tests and the demo binary

use super::document::{FullscreenOptions, SimulatedDocument};
use super::media::{EventListener, ListenerId, MediaElement, MediaEvent, PictureInPictureWindow};
use crate::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct ElementState {
    current_time: f64,
    duration: f64,
    paused: bool,
    muted: bool,
    volume: f64,
    playback_rate: f64,
    looping: bool,
    ready: bool,
    autoplay_blocked: bool,
    width: u32,
    height: u32,
}

/// A video element that keeps its playback state in memory and dispatches
/// the same events a browser element would for each state change.
///
/// Events can also be injected directly with [`SimulatedVideoElement::dispatch`].
pub struct SimulatedVideoElement {
    id: u64,
    state: Mutex<ElementState>,
    listeners: Mutex<Vec<(MediaEvent, ListenerId, EventListener)>>,
    next_listener: AtomicU64,
    document: Option<Arc<SimulatedDocument>>,
}

impl SimulatedVideoElement {
    /// Create a detached element (fullscreen and PiP are unsupported)
    pub fn new() -> Self {
        SimulatedVideoElement {
            id: NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed),
            state: Mutex::new(ElementState {
                current_time: 0.0,
                duration: f64::NAN,
                paused: true,
                muted: false,
                volume: 1.0,
                playback_rate: 1.0,
                looping: false,
                ready: true,
                autoplay_blocked: false,
                width: 640,
                height: 360,
            }),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            document: None,
        }
    }

    /// Create an element living in `document`
    pub fn attached_to(document: Arc<SimulatedDocument>) -> Self {
        SimulatedVideoElement {
            document: Some(document),
            ..Self::new()
        }
    }

    fn state(&self) -> MutexGuard<'_, ElementState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(MediaEvent, ListenerId, EventListener)>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Unique id used by the document to track fullscreen/PiP ownership
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of currently registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    /// Fire `event` at every listener registered for it
    pub fn dispatch(&self, event: MediaEvent) {
        // Listeners may call back into the element, so never hold the lock while invoking them.
        let targets: Vec<EventListener> = self
            .listeners()
            .iter()
            .filter(|(ev, _, _)| *ev == event)
            .map(|(_, _, l)| l.clone())
            .collect();
        for listener in targets {
            listener(event);
        }
    }

    /// Load metadata for media of the given length
    pub fn set_duration(&self, seconds: f64) {
        self.state().duration = seconds;
        self.dispatch(MediaEvent::DurationChange);
    }

    /// Toggle whether enough data is buffered to keep playing.
    ///
    /// Losing data while playing fires `waiting`; regaining it fires
    /// `canplay` followed by `playing`.
    pub fn set_ready(&self, ready: bool) {
        let (changed, paused) = {
            let mut s = self.state();
            let changed = s.ready != ready;
            s.ready = ready;
            (changed, s.paused)
        };
        if !changed {
            return;
        }
        if ready {
            self.dispatch(MediaEvent::CanPlay);
            if !paused {
                self.dispatch(MediaEvent::Playing);
            }
        } else if !paused {
            self.dispatch(MediaEvent::Waiting);
        }
    }

    /// Make `play()` fail as if blocked by an autoplay policy
    pub fn set_autoplay_blocked(&self, blocked: bool) {
        self.state().autoplay_blocked = blocked;
    }

    /// Advance the playback clock by `seconds` of wall time.
    ///
    /// Handles reaching the end of the media: loops back to zero when
    /// looping, otherwise pauses and fires `ended`.
    pub fn advance(&self, seconds: f64) {
        enum Outcome {
            Idle,
            Progress,
            Looped,
            Ended,
        }

        let outcome = {
            let mut s = self.state();
            if s.paused || !s.ready {
                Outcome::Idle
            } else {
                s.current_time += seconds * s.playback_rate;
                if s.duration.is_finite() && s.current_time >= s.duration {
                    if s.looping {
                        s.current_time = 0.0;
                        Outcome::Looped
                    } else {
                        s.current_time = s.duration;
                        s.paused = true;
                        Outcome::Ended
                    }
                } else {
                    Outcome::Progress
                }
            }
        };

        match outcome {
            Outcome::Idle => {}
            Outcome::Progress => self.dispatch(MediaEvent::TimeUpdate),
            Outcome::Looped => {
                self.dispatch(MediaEvent::Seeking);
                self.dispatch(MediaEvent::TimeUpdate);
                self.dispatch(MediaEvent::Seeked);
            }
            Outcome::Ended => {
                self.dispatch(MediaEvent::TimeUpdate);
                self.dispatch(MediaEvent::Pause);
                self.dispatch(MediaEvent::Ended);
            }
        }
    }
}

impl Default for SimulatedVideoElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaElement for SimulatedVideoElement {
    fn current_time(&self) -> f64 {
        self.state().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        {
            let mut s = self.state();
            let mut t = seconds.max(0.0);
            if s.duration.is_finite() {
                t = t.min(s.duration);
            }
            s.current_time = t;
        }
        self.dispatch(MediaEvent::Seeking);
        self.dispatch(MediaEvent::TimeUpdate);
        self.dispatch(MediaEvent::Seeked);
    }

    fn duration(&self) -> f64 {
        self.state().duration
    }

    fn paused(&self) -> bool {
        self.state().paused
    }

    fn muted(&self) -> bool {
        self.state().muted
    }

    fn set_muted(&self, muted: bool) {
        let changed = {
            let mut s = self.state();
            std::mem::replace(&mut s.muted, muted) != muted
        };
        if changed {
            self.dispatch(MediaEvent::VolumeChange);
        }
    }

    fn volume(&self) -> f64 {
        self.state().volume
    }

    fn set_volume(&self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        let changed = {
            let mut s = self.state();
            std::mem::replace(&mut s.volume, volume) != volume
        };
        if changed {
            self.dispatch(MediaEvent::VolumeChange);
        }
    }

    fn playback_rate(&self) -> f64 {
        self.state().playback_rate
    }

    fn set_playback_rate(&self, rate: f64) {
        let changed = {
            let mut s = self.state();
            std::mem::replace(&mut s.playback_rate, rate) != rate
        };
        if changed {
            self.dispatch(MediaEvent::RateChange);
        }
    }

    fn looping(&self) -> bool {
        self.state().looping
    }

    fn set_looping(&self, looping: bool) {
        self.state().looping = looping;
    }

    fn play(&self) -> Result<()> {
        let (was_paused, ready) = {
            let mut s = self.state();
            if s.autoplay_blocked {
                return Err(Error::NotAllowed("play() blocked by autoplay policy".to_string()));
            }
            let was_paused = s.paused;
            s.paused = false;
            if s.duration.is_finite() && s.current_time >= s.duration && !s.looping {
                s.current_time = 0.0;
            }
            (was_paused, s.ready)
        };
        if was_paused {
            self.dispatch(MediaEvent::Play);
            if ready {
                self.dispatch(MediaEvent::Playing);
            } else {
                self.dispatch(MediaEvent::Waiting);
            }
        }
        Ok(())
    }

    fn pause(&self) {
        let was_playing = {
            let mut s = self.state();
            !std::mem::replace(&mut s.paused, true)
        };
        if was_playing {
            self.dispatch(MediaEvent::TimeUpdate);
            self.dispatch(MediaEvent::Pause);
        }
    }

    fn request_picture_in_picture(&self) -> Result<PictureInPictureWindow> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| Error::NotSupported("element is not attached to a document".to_string()))?;
        doc.enter_picture_in_picture(self.id)?;
        let s = self.state();
        Ok(PictureInPictureWindow {
            width: s.width,
            height: s.height,
        })
    }

    fn request_fullscreen(&self, options: Option<FullscreenOptions>) -> Result<()> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| Error::NotSupported("element is not attached to a document".to_string()))?;
        doc.enter_fullscreen(self.id, options.unwrap_or_default())
    }

    fn add_event_listener(&self, event: MediaEvent, listener: EventListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners().push((event, id, listener));
        id
    }

    fn remove_event_listener(&self, event: MediaEvent, id: ListenerId) {
        self.listeners()
            .retain(|(ev, lid, _)| !(*ev == event && *lid == id));
    }
}
