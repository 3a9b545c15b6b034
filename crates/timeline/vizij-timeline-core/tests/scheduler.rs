use vizij_timeline_core::PlaybackClock;

fn playing(fps: f64) -> PlaybackClock {
    let mut clock = PlaybackClock::new(fps);
    clock.play();
    clock
}

/// it should advance one frame per 1/fps of elapsed time
#[test]
fn one_step_per_frame_duration() {
    let mut clock = playing(30.0);
    let mut frame = 0;
    assert_eq!(clock.advance(1.0 / 30.0, &mut frame, 0, 100), 1);
    assert_eq!(frame, 1);
    assert_eq!(clock.advance(1.0 / 15.0, &mut frame, 0, 100), 2);
    assert_eq!(frame, 3);
}

/// it should not drift over many exact-duration ticks
#[test]
fn exact_ticks_do_not_drift() {
    let mut clock = playing(30.0);
    let mut frame = 0;
    for _ in 0..300 {
        clock.advance(1.0 / 30.0, &mut frame, 0, 1000);
    }
    assert_eq!(frame, 300);
}

/// it should wrap past frame_max back to frame_min
#[test]
fn wraps_to_min() {
    let mut clock = playing(30.0);
    let mut frame = 10;
    clock.advance(1.0 / 30.0, &mut frame, 0, 10);
    assert_eq!(frame, 0);

    let mut frame = 9;
    assert_eq!(clock.advance(3.0 / 30.0, &mut frame, 2, 10), 3);
    assert_eq!(frame, 3);
}

/// it should discard accumulated time when paused or toggled off
#[test]
fn pausing_resets_accumulator() {
    let mut clock = playing(30.0);
    let mut frame = 0;
    clock.advance(0.02, &mut frame, 0, 100);
    assert!(clock.accumulator() > 0.0);

    assert!(!clock.toggle());
    assert_eq!(clock.accumulator(), 0.0);
    assert_eq!(clock.advance(1.0, &mut frame, 0, 100), 0);
    assert_eq!(frame, 0);

    assert!(clock.toggle());
    clock.advance(0.02, &mut frame, 0, 100);
    clock.stop();
    assert!(!clock.is_playing());
    assert_eq!(clock.accumulator(), 0.0);
}

/// it should take no steps for a non-positive or non-finite rate
#[test]
fn invalid_rates_never_step() {
    for fps in [0.0, -30.0, f64::NAN, f64::INFINITY] {
        let mut clock = playing(fps);
        let mut frame = 4;
        assert_eq!(clock.advance(10.0, &mut frame, 0, 100), 0, "fps {fps}");
        assert_eq!(frame, 4);
    }
}

/// it should ignore negative and non-finite deltas
#[test]
fn bad_deltas_are_ignored() {
    let mut clock = playing(30.0);
    let mut frame = 0;
    assert_eq!(clock.advance(-1.0, &mut frame, 0, 100), 0);
    assert_eq!(clock.advance(f32::NAN, &mut frame, 0, 100), 0);
    assert_eq!(frame, 0);
}
