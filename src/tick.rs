//! Fixed-interval tick scheduling for the render loop.

use std::time::{Duration, Instant};

/// Fires at most once per [`Ticker::poll`], once every `interval`.
///
/// When the loop falls more than one interval behind, the missed ticks are dropped instead of
/// being replayed back to back.
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    /// Creates a ticker whose first tick is due one interval after `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            interval,
            next: now + interval,
        }
    }

    /// Returns `true` if a tick is due at `now`, and schedules the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }

    /// How long the loop may wait before the next tick is due.
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
