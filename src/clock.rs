use lazy_static::lazy_static;
use std::time::Instant;

/// Monotonic elapsed-time source used to measure statement executions.
///
/// The interceptor only requires monotonicity within a single execution's start/stop pair, so the reading is an
/// opaque millisecond count from an arbitrary fixed origin rather than a wall-clock time.
pub trait Clock {
    /// Current reading in milliseconds.
    fn current_time(&self) -> u64;

    /// Milliseconds elapsed since a reading previously returned by {{Clock::current_time}}.
    fn elapsed_millis(&self, start: u64) -> u64 {
        self.current_time().saturating_sub(start)
    }
}

lazy_static! {
    /// The clock used by connections when creating statements.
    pub static ref MONOTONIC: MonotonicClock = MonotonicClock::new();
}

/// A {{Clock}} backed by {{std::time::Instant}}, anchored at its creation.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn current_time(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// A clock advanced manually, for tests that need deterministic latencies.
#[cfg(any(test, feature = "mock"))]
pub struct ManualClock {
    now: std::cell::Cell<u64>,
}

#[cfg(any(test, feature = "mock"))]
impl ManualClock {
    pub fn new() -> Self {
        Self { now: std::cell::Cell::new(0) }
    }

    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis);
    }
}

#[cfg(any(test, feature = "mock"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "mock"))]
impl Clock for ManualClock {
    fn current_time(&self) -> u64 {
        self.now.get()
    }
}
