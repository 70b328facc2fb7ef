//! Integration tests for the controls bridge

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use video_controls::platform::{
    FullscreenOptions, MediaElement, MediaEvent, NavigationUi, SimulatedDocument, SimulatedVideoElement,
};
use video_controls::{
    use_video_controls, ControlsScope, Error, PlayStatus, UseVideoControlsParams, VideoStatus,
};

fn mounted_scope() -> (ControlsScope, Arc<SimulatedVideoElement>, Arc<SimulatedDocument>) {
    let document = Arc::new(SimulatedDocument::new());
    let scope = ControlsScope::new(document.clone());
    let element = Arc::new(SimulatedVideoElement::attached_to(document.clone()));
    scope.element_ref().bind(element.clone());
    scope.mount();
    (scope, element, document)
}

#[test]
fn test_raw_status_tracks_last_event_and_refreshes_once_per_change() {
    let (scope, element, _) = mounted_scope();
    let (controls, _) = scope.use_video_controls(UseVideoControlsParams::default());
    let events = [MediaEvent::CanPlay, MediaEvent::Play, MediaEvent::Ended];

    // deterministic pseudo-random sequence
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut last = controls.status();
    let mut expected_refreshes = 0;
    let start = scope.refresh_generation();
    for _ in 0..200 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let ev = events[(seed >> 33) as usize % events.len()];
        let status = ev.status().unwrap();
        if status != last {
            expected_refreshes += 1;
            last = status;
        }
        element.dispatch(ev);
        assert_eq!(controls.status(), last);
    }
    assert_eq!(scope.refresh_generation() - start, expected_refreshes);
}

#[test]
fn test_play_pause_drive_play_status() {
    let (scope, _, _) = mounted_scope();
    let (controls, _) = scope.use_video_controls(UseVideoControlsParams::default());

    controls.play().unwrap();
    assert_eq!(controls.status(), VideoStatus::Playing);
    assert_eq!(controls.play_status(), PlayStatus::Playing);
    assert!(!controls.paused());

    controls.pause();
    assert_eq!(controls.status(), VideoStatus::Pause);
    assert_eq!(controls.play_status(), PlayStatus::Paused);
    assert!(controls.paused());
}

#[test]
fn test_live_property_reads_and_writes() {
    let (scope, element, _) = mounted_scope();
    let (controls, _) = scope.use_video_controls(UseVideoControlsParams::default());

    element.set_duration(30.0);
    assert_eq!(controls.duration(), 30.0);

    controls.set_current_time(12.5);
    assert_eq!(element.current_time(), 12.5);
    assert_eq!(controls.status(), VideoStatus::Seeked);

    controls.set_playback_rate(1.25);
    assert_eq!(controls.playback_rate(), 1.25);

    controls.set_looping(true);
    assert!(element.looping());

    element.set_muted(true);
    assert!(controls.muted());
}

#[test]
fn test_volume_write_couples_mute() {
    let (scope, element, _) = mounted_scope();
    let (controls, _) = scope.use_video_controls(UseVideoControlsParams::default());

    controls.set_volume(0.0);
    assert!(controls.muted());

    for i in 1..=100 {
        let v = i as f64 / 100.0;
        controls.set_volume(0.0);
        assert!(element.muted());
        controls.set_volume(v);
        assert!(!controls.muted(), "volume {} should unmute", v);
        assert_eq!(controls.volume(), v);
    }
}

#[test]
fn test_defaults_applied_on_mount() {
    let scope = ControlsScope::default();
    let (controls, element_ref) = scope.use_video_controls(UseVideoControlsParams {
        default_mute: true,
        default_volume: 0.4,
        default_play_rate: 2.0,
        default_loop: true,
    });
    let element = Arc::new(SimulatedVideoElement::new());
    element_ref.bind(element.clone());
    assert!(scope.mount());

    assert!(element.muted());
    assert_eq!(element.volume(), 0.4);
    assert_eq!(element.playback_rate(), 2.0);
    assert!(element.looping());
    assert_eq!(controls.volume(), 0.4);
}

#[test]
fn test_unbound_reads_defaults_and_writes_are_noops() {
    let scope = ControlsScope::default();
    let params = UseVideoControlsParams {
        default_mute: true,
        default_volume: 0.7,
        default_play_rate: 0.5,
        default_loop: true,
    };
    let (controls, element_ref) = scope.use_video_controls(params);
    assert!(!element_ref.is_bound());
    assert!(controls.element().is_none());

    assert_eq!(controls.current_time(), 0.0);
    assert_eq!(controls.duration(), 0.0);
    assert!(!controls.paused());
    assert!(controls.muted());
    assert_eq!(controls.volume(), 0.7);
    assert_eq!(controls.playback_rate(), 0.5);
    assert!(controls.looping());
    assert_eq!(controls.status(), VideoStatus::Pause);
    assert_eq!(controls.play_status(), PlayStatus::Paused);

    controls.set_current_time(5.0);
    controls.set_muted(false);
    controls.set_volume(0.0);
    controls.set_playback_rate(3.0);
    controls.set_looping(false);
    controls.pause();
    assert!(controls.play().is_ok());
    assert_eq!(controls.request_picture_in_picture().unwrap(), None);
    assert!(controls.request_fullscreen(None).is_ok());
    assert!(controls.exit_fullscreen().is_ok());
    assert!(controls.exit_picture_in_picture().is_ok());

    assert!(controls.muted());
    assert_eq!(controls.volume(), 0.7);
    assert_eq!(scope.refresh_generation(), 0);
}

#[test]
fn test_consumer_without_provider_degrades() {
    let (controls, element_ref) = use_video_controls(None, UseVideoControlsParams::default());
    assert!(!element_ref.is_bound());
    assert_eq!(controls.volume(), 1.0);
    assert!(!controls.muted());
    assert!(controls.play().is_ok());
}

#[test]
fn test_consumer_without_provider_observes_events_after_mount() {
    let (controls, element_ref) = use_video_controls(
        None,
        UseVideoControlsParams {
            default_mute: true,
            default_play_rate: 2.0,
            ..Default::default()
        },
    );
    let element = Arc::new(SimulatedVideoElement::new());
    element_ref.bind(element.clone());
    assert!(controls.mount());
    assert!(element.muted());
    assert_eq!(element.playback_rate(), 2.0);

    element.dispatch(MediaEvent::CanPlay);
    assert_eq!(controls.status(), VideoStatus::CanPlay);
    element.dispatch(MediaEvent::Playing);
    assert_eq!(controls.play_status(), PlayStatus::Playing);

    controls.unmount();
    element.dispatch(MediaEvent::Ended);
    assert_eq!(controls.status(), VideoStatus::Playing);
}

#[test]
fn test_unmount_stops_projection() {
    let (scope, element, _) = mounted_scope();
    let (controls, _) = scope.use_video_controls(UseVideoControlsParams::default());
    element.dispatch(MediaEvent::CanPlay);
    let generation = scope.refresh_generation();

    scope.unmount();
    assert_eq!(element.listener_count(), 0);

    for ev in MediaEvent::ALL {
        element.dispatch(ev);
    }
    assert_eq!(scope.refresh_generation(), generation);
    assert_eq!(controls.status(), VideoStatus::CanPlay);
    assert_eq!(controls.play_status(), PlayStatus::Paused);
}

#[test]
fn test_consumers_share_one_setup_and_one_state() {
    let scope = ControlsScope::default();
    let (first, first_ref) = scope.use_video_controls(UseVideoControlsParams::default());
    let (second, second_ref) = scope.use_video_controls(UseVideoControlsParams {
        default_volume: 0.1,
        ..Default::default()
    });
    assert!(first_ref.ptr_eq(&second_ref));
    assert!(!first.ptr_eq(&second));

    let element = Arc::new(SimulatedVideoElement::new());
    first_ref.bind(element.clone());
    scope.mount();
    let (_third, _) = scope.use_video_controls(UseVideoControlsParams::default());
    assert_eq!(element.listener_count(), MediaEvent::ALL.len());

    // first consumer's defaults win
    assert_eq!(second.volume(), 1.0);

    for ev in [MediaEvent::Play, MediaEvent::Playing, MediaEvent::Seeking, MediaEvent::Pause] {
        element.dispatch(ev);
        assert_eq!(first.status(), second.status());
        assert_eq!(first.play_status(), second.play_status());
    }
}

#[test]
fn test_subscribers_see_new_values_on_refresh() {
    let (scope, element, _) = mounted_scope();
    let (controls, _) = scope.use_video_controls(UseVideoControlsParams::default());
    let seen_playing = Arc::new(AtomicU64::new(0));

    let reader = controls.clone();
    let hits = seen_playing.clone();
    let id = scope.subscribe(move || {
        if reader.status() == VideoStatus::Playing {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    });

    element.dispatch(MediaEvent::Playing);
    assert_eq!(seen_playing.load(Ordering::SeqCst), 1);
    assert!(scope.unsubscribe(id));
}

#[test]
fn test_fullscreen_and_pip_forwarding() {
    let (scope, element, document) = mounted_scope();
    let (controls, _) = scope.use_video_controls(UseVideoControlsParams::default());

    controls
        .request_fullscreen(Some(FullscreenOptions {
            navigation_ui: NavigationUi::Hide,
        }))
        .unwrap();
    assert_eq!(document.fullscreen_element(), Some(element.id()));
    assert_eq!(
        document.fullscreen_options().map(|o| o.navigation_ui),
        Some(NavigationUi::Hide)
    );
    controls.exit_fullscreen().unwrap();
    assert!(document.fullscreen_element().is_none());

    let window = controls.request_picture_in_picture().unwrap();
    assert!(window.is_some());
    assert_eq!(document.picture_in_picture_element(), Some(element.id()));
    controls.exit_picture_in_picture().unwrap();
    assert!(document.picture_in_picture_element().is_none());
}

#[test]
fn test_native_rejections_are_propagated() {
    let (scope, element, document) = mounted_scope();
    let (controls, _) = scope.use_video_controls(UseVideoControlsParams::default());

    document.set_fullscreen_enabled(false);
    assert!(matches!(controls.request_fullscreen(None), Err(Error::NotAllowed(_))));

    document.set_picture_in_picture_enabled(false);
    assert!(matches!(controls.request_picture_in_picture(), Err(Error::NotAllowed(_))));

    assert!(matches!(controls.exit_fullscreen(), Err(Error::InvalidState(_))));

    element.set_autoplay_blocked(true);
    assert!(matches!(controls.play(), Err(Error::NotAllowed(_))));
    assert_eq!(controls.play_status(), PlayStatus::Paused);
}

#[test]
fn test_clearing_the_element_and_remounting() {
    let (scope, element, _) = mounted_scope();
    let (controls, element_ref) = scope.use_video_controls(UseVideoControlsParams::default());

    element_ref.clear();
    assert!(!scope.mount());
    assert_eq!(element.listener_count(), 0);
    assert_eq!(controls.volume(), 1.0);

    let replacement = Arc::new(SimulatedVideoElement::new());
    element_ref.bind(replacement.clone());
    assert!(scope.mount());
    replacement.dispatch(MediaEvent::Ended);
    assert_eq!(controls.status(), VideoStatus::Ended);
}
