// Countdown semantics: exactly-once expiry, stale-generation discard,
// idempotent stop, extension without elapsed reset. Native-friendly, no wasm.

use hero_quiz::quiz::{Countdown, Tick};

#[test]
fn expires_exactly_once_after_duration_ticks() {
    let mut countdown = Countdown::new();
    let generation = countdown.start(5);
    for expected in (1..5).rev() {
        assert_eq!(countdown.tick(generation), Tick::Running(expected));
    }
    assert_eq!(countdown.tick(generation), Tick::Expired);
    // No further ticks are honored for this run.
    assert_eq!(countdown.tick(generation), Tick::Stale);
    assert_eq!(countdown.tick(generation), Tick::Stale);
}

#[test]
fn stop_discards_in_flight_ticks() {
    let mut countdown = Countdown::new();
    let generation = countdown.start(3);
    assert_eq!(countdown.tick(generation), Tick::Running(2));
    countdown.stop();
    // A tick queued before stop() but delivered after it must be ignored.
    assert_eq!(countdown.tick(generation), Tick::Stale);
    assert!(!countdown.is_running());
}

#[test]
fn stop_is_idempotent() {
    let mut countdown = Countdown::new();
    let generation = countdown.start(4);
    countdown.stop();
    let remaining = countdown.remaining();
    let elapsed = countdown.elapsed_seconds();
    countdown.stop();
    assert_eq!(countdown.remaining(), remaining);
    assert_eq!(countdown.elapsed_seconds(), elapsed);
    assert_eq!(countdown.tick(generation), Tick::Stale);
}

#[test]
fn restart_supersedes_previous_generation() {
    let mut countdown = Countdown::new();
    let first = countdown.start(10);
    let second = countdown.start(10);
    assert_ne!(first, second);
    assert_eq!(countdown.tick(first), Tick::Stale);
    assert_eq!(countdown.tick(second), Tick::Running(9));
}

#[test]
fn extend_grows_remaining_without_touching_elapsed() {
    let mut countdown = Countdown::new();
    let generation = countdown.start(5);
    assert_eq!(countdown.tick(generation), Tick::Running(4));
    assert_eq!(countdown.elapsed_seconds(), 1);
    countdown.extend(10);
    assert_eq!(countdown.remaining(), 14);
    assert_eq!(countdown.elapsed_seconds(), 1);
    assert_eq!(countdown.tick(generation), Tick::Running(13));
    assert_eq!(countdown.elapsed_seconds(), 2);
}

#[test]
fn extend_on_idle_countdown_does_nothing() {
    let mut countdown = Countdown::new();
    countdown.extend(30);
    assert_eq!(countdown.remaining(), 0);
    assert!(!countdown.is_running());
}

#[test]
fn zero_duration_start_never_runs() {
    let mut countdown = Countdown::new();
    let generation = countdown.start(0);
    assert!(!countdown.is_running());
    assert_eq!(countdown.tick(generation), Tick::Stale);
}
