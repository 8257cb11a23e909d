//! Session countdown.
//!
//! A single `Countdown` serves both the per-question time limit and the short
//! answer-review delay: starting a new run implicitly stops the previous one.
//! Ticks are driven externally (the web layer owns a 1 Hz interval) and carry
//! the generation returned by `start`, so a tick scheduled before `stop` but
//! delivered after it is recognized as stale and discarded.

/// Opaque token identifying one `start` call. Ticks carrying an older token
/// are ignored.
pub type TimerGeneration = u64;

/// Outcome of a single one-second tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// The tick belonged to a stopped or superseded run; nothing happened.
    Stale,
    /// Countdown still running; payload is the new remaining seconds.
    Running(u32),
    /// Countdown reached zero. Reported exactly once per run.
    Expired,
}

#[derive(Debug)]
pub struct Countdown {
    remaining: u32,
    elapsed: u32,
    running: bool,
    generation: TimerGeneration,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            remaining: 0,
            elapsed: 0,
            running: false,
            generation: 0,
        }
    }

    /// Begin a new run, superseding any active one. Returns the generation
    /// token that subsequent `tick` calls must present.
    pub fn start(&mut self, duration_seconds: u32) -> TimerGeneration {
        self.generation += 1;
        self.remaining = duration_seconds;
        self.elapsed = 0;
        self.running = duration_seconds > 0;
        self.generation
    }

    /// Cancel the active run. Safe to call repeatedly; the second call is a
    /// no-op, and calling from within expiry handling is harmless because an
    /// expired run is already stopped.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.generation += 1;
        }
    }

    /// Add seconds to the current run without touching the elapsed count used
    /// for scoring. Ignored when no run is active.
    pub fn extend(&mut self, delta_seconds: u32) {
        if self.running {
            self.remaining += delta_seconds;
        }
    }

    /// Advance the countdown by one second on behalf of the given run.
    pub fn tick(&mut self, generation: TimerGeneration) -> Tick {
        if !self.running || generation != self.generation {
            return Tick::Stale;
        }
        self.elapsed += 1;
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whole seconds consumed by the current run. Unaffected by `extend`.
    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}
