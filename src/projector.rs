//! Event-to-state projector
//!
//! Listens to the element's native events and projects them onto the two
//! status fields. Lifecycle events set the raw [`VideoStatus`] verbatim;
//! `playing`/`pause`/`waiting` drive the debounced [`PlayStatus`]. A refresh
//! is requested only when a projected value actually changes, except for
//! the events that exist purely to make the UI re-read live element state.

use crate::platform::{ListenerId, MediaElement, MediaEvent};
use crate::refresh::RefreshNotifier;
use crate::status::{PlayStatus, VideoStatus};
use crate::UseVideoControlsParams;
use log::{debug, warn};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// How long the element must stay stalled before `PlayStatus::Waiting` is reported
pub const WAITING_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct Statuses {
    status: VideoStatus,
    play_status: PlayStatus,
    /// Bumped whenever the buffering timer is started or cancelled; a timer
    /// only applies its status if the generation it captured is still current.
    waiting_generation: u64,
}

struct Registration {
    element: Arc<dyn MediaElement>,
    listeners: Vec<(MediaEvent, ListenerId)>,
}

enum TimerCommand {
    Start { generation: u64, deadline: Instant },
    Cancel,
}

/// Owner of the status fields and of the listener registration on the
/// currently mounted element. There is one projector per scope.
///
/// Lock order is `registration`, then `statuses`, then the timer slots.
pub struct Projector {
    statuses: Mutex<Statuses>,
    refresh: Arc<RefreshNotifier>,
    pending_timer: Mutex<Option<JoinHandle<()>>>,
    fallback_timer: Mutex<Option<Sender<TimerCommand>>>,
    registration: Mutex<Option<Registration>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl Projector {
    pub fn new(refresh: Arc<RefreshNotifier>) -> Self {
        Projector {
            statuses: Mutex::new(Statuses::default()),
            refresh,
            pending_timer: Mutex::new(None),
            fallback_timer: Mutex::new(None),
            registration: Mutex::new(None),
        }
    }

    pub fn status(&self) -> VideoStatus {
        lock(&self.statuses).status
    }

    pub fn play_status(&self) -> PlayStatus {
        lock(&self.statuses).play_status
    }

    /// The element listeners are currently registered on
    pub fn mounted_element(&self) -> Option<Arc<dyn MediaElement>> {
        lock(&self.registration).as_ref().map(|r| r.element.clone())
    }

    /// Apply defaults to `element` and register one listener per observed
    /// event. Any previous registration is torn down first.
    pub fn setup(self: &Arc<Self>, element: Arc<dyn MediaElement>, defaults: &UseVideoControlsParams) {
        let mut registration = lock(&self.registration);
        self.register(&mut registration, element, defaults);
    }

    /// Like [`Projector::setup`], but does nothing when listeners are already
    /// registered on this exact element. The identity check and the
    /// re-registration happen under one lock, so concurrent callers never
    /// leave a second listener set behind. Returns whether setup ran.
    pub fn setup_if_changed(
        self: &Arc<Self>,
        element: Arc<dyn MediaElement>,
        defaults: &UseVideoControlsParams,
    ) -> bool {
        let mut registration = lock(&self.registration);
        if let Some(current) = registration.as_ref() {
            if same_element(&current.element, &element) {
                return false;
            }
            debug!("element identity changed, re-running setup");
        }
        self.register(&mut registration, element, defaults);
        true
    }

    fn register(
        self: &Arc<Self>,
        registration: &mut Option<Registration>,
        element: Arc<dyn MediaElement>,
        defaults: &UseVideoControlsParams,
    ) {
        self.unregister(registration);

        element.set_muted(defaults.default_mute);
        element.set_volume(defaults.default_volume);
        element.set_playback_rate(defaults.default_play_rate);
        element.set_looping(defaults.default_loop);

        let listeners = MediaEvent::ALL
            .into_iter()
            .map(|event| {
                let weak: Weak<Projector> = Arc::downgrade(self);
                let id = element.add_event_listener(
                    event,
                    Arc::new(move |ev| {
                        if let Some(p) = weak.upgrade() {
                            p.project(ev);
                        }
                    }),
                );
                (event, id)
            })
            .collect::<Vec<_>>();

        debug!("registered {} media listeners", listeners.len());
        *registration = Some(Registration { element, listeners });
    }

    /// Remove every registered listener and cancel the buffering timer.
    /// Safe to call when nothing is mounted.
    pub fn teardown(&self) {
        let mut registration = lock(&self.registration);
        self.unregister(&mut registration);
    }

    fn unregister(&self, registration: &mut Option<Registration>) {
        self.cancel_waiting_timer();
        if let Some(reg) = registration.take() {
            for (event, id) in &reg.listeners {
                reg.element.remove_event_listener(*event, *id);
            }
            debug!("removed {} media listeners", reg.listeners.len());
        }
    }

    /// Project one native event onto the status fields
    pub fn project(self: &Arc<Self>, event: MediaEvent) {
        let changed = {
            let mut s = lock(&self.statuses);
            let mut changed = false;

            if let Some(status) = event.status() {
                if s.status != status {
                    s.status = status;
                    changed = true;
                }
            }

            match event {
                MediaEvent::Playing | MediaEvent::Pause => {
                    s.waiting_generation += 1;
                    let next = if event == MediaEvent::Playing {
                        PlayStatus::Playing
                    } else {
                        PlayStatus::Paused
                    };
                    if s.play_status != next {
                        s.play_status = next;
                        changed = true;
                    }
                }
                MediaEvent::Seeking
                | MediaEvent::Seeked
                | MediaEvent::TimeUpdate
                | MediaEvent::DurationChange
                | MediaEvent::VolumeChange
                | MediaEvent::RateChange => changed = true,
                _ => {}
            }
            changed
        };

        match event {
            MediaEvent::Playing | MediaEvent::Pause => self.abort_pending_timer(),
            MediaEvent::Waiting => self.start_waiting_timer(),
            _ => {}
        }

        if changed {
            self.refresh.refresh();
        }
    }

    /// Start (or restart) the one-shot buffering timer.
    ///
    /// The timer runs on whichever tokio runtime is current for the caller.
    /// Outside a runtime it goes to this projector's fallback timer thread.
    fn start_waiting_timer(self: &Arc<Self>) {
        let generation = {
            let mut s = lock(&self.statuses);
            s.waiting_generation += 1;
            s.waiting_generation
        };
        self.abort_pending_timer();

        match Handle::try_current() {
            Ok(rt) => {
                let weak = Arc::downgrade(self);
                let task = rt.spawn(async move {
                    tokio::time::sleep(WAITING_DEBOUNCE).await;
                    if let Some(p) = weak.upgrade() {
                        p.waiting_elapsed(generation);
                    }
                });
                *lock(&self.pending_timer) = Some(task);
            }
            Err(_) => self.start_fallback_timer(generation),
        }
    }

    fn start_fallback_timer(self: &Arc<Self>, generation: u64) {
        let mut slot = lock(&self.fallback_timer);
        let sender = match slot.take() {
            Some(sender) => sender,
            None => match spawn_fallback_timer(Arc::downgrade(self)) {
                Ok(sender) => sender,
                Err(e) => {
                    warn!("failed to start buffering timer thread: {}", e);
                    return;
                }
            },
        };
        let command = TimerCommand::Start {
            generation,
            deadline: Instant::now() + WAITING_DEBOUNCE,
        };
        match sender.send(command) {
            Ok(()) => *slot = Some(sender),
            Err(_) => warn!("buffering timer thread has exited"),
        }
    }

    fn waiting_elapsed(&self, generation: u64) {
        let changed = {
            let mut s = lock(&self.statuses);
            if s.waiting_generation != generation || s.play_status == PlayStatus::Waiting {
                false
            } else {
                s.play_status = PlayStatus::Waiting;
                true
            }
        };
        if changed {
            debug!("stalled for {:?}, reporting waiting", WAITING_DEBOUNCE);
            self.refresh.refresh();
        }
    }

    fn abort_pending_timer(&self) {
        if let Some(task) = lock(&self.pending_timer).take() {
            task.abort();
        }
        if let Some(sender) = lock(&self.fallback_timer).as_ref() {
            let _ = sender.send(TimerCommand::Cancel);
        }
    }

    fn cancel_waiting_timer(&self) {
        lock(&self.statuses).waiting_generation += 1;
        self.abort_pending_timer();
    }
}

impl Drop for Projector {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Compare element identity by data pointer only
pub(crate) fn same_element(a: &Arc<dyn MediaElement>, b: &Arc<dyn MediaElement>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

fn spawn_fallback_timer(projector: Weak<Projector>) -> std::io::Result<Sender<TimerCommand>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("video-controls-timer".to_string())
        .spawn(move || run_fallback_timer(projector, rx))?;
    debug!("started buffering timer thread");
    Ok(tx)
}

/// One deadline at a time: a new start replaces it, a cancel clears it.
/// Exits once the projector and its sender are gone.
fn run_fallback_timer(projector: Weak<Projector>, rx: Receiver<TimerCommand>) {
    let mut pending: Option<(Instant, u64)> = None;
    loop {
        let command = match pending {
            Some((deadline, generation)) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => {
                        pending = None;
                        match projector.upgrade() {
                            Some(p) => p.waiting_elapsed(generation),
                            None => return,
                        }
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
            None => match rx.recv() {
                Ok(command) => command,
                Err(_) => return,
            },
        };
        pending = match command {
            TimerCommand::Start { generation, deadline } => Some((deadline, generation)),
            TimerCommand::Cancel => None,
        };
    }
}

/// Log the unbound-element diagnostic for a setup attempt
pub(crate) fn warn_unbound() {
    warn!("video element is not defined");
}
