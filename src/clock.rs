//! Fixed-rate tick clock for the main loop.

use std::time::{Duration, Instant};

/// Falling speed: one game tick per 100 ms.
pub const TICKS_PER_SECOND: u32 = 10;

/// Paces a loop to a fixed rate, like a frame limiter: each call to [`TickClock::wait_time`]
/// returns how long to sleep so that successive ticks are at least one interval apart.
///
/// A slow iteration is not paid back by later short ones; the next deadline is always measured
/// from the later of "now" and the previous deadline.
#[derive(Debug, Clone)]
pub struct TickClock {
    interval: Duration,
    last: Instant,
}

impl TickClock {
    pub fn new(ticks_per_second: u32, now: Instant) -> Self {
        Self {
            interval: Duration::from_secs(1) / ticks_per_second.max(1),
            last: now,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next tick is due, and mark that tick as taken.
    pub fn wait_time(&mut self, now: Instant) -> Duration {
        let due = self.last + self.interval;
        let wait = due.saturating_duration_since(now);
        self.last = due.max(now);
        wait
    }

    /// Sleep until the next tick is due.
    pub fn wait(&mut self) {
        let wait = self.wait_time(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}
