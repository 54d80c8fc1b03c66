/*!
    Capture timestamps.
*/

use std::time::{Duration, Instant};

/**
    Source of the timestamp attached to each captured unit.

    Timestamps are offsets from the start of the session, not absolute
    times, so captures can be compared across runs.
*/
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock started.
    fn elapsed(&self) -> Duration;
}

/**
    Monotonic wall-time clock started at session creation.
*/
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

static_assertions::assert_impl_all!(WallClock: Send, Sync, Clock);
