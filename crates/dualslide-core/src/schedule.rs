//! Periodic background work polled by the host loop.

use crate::clock::{Duration, Instant};

/// How often the presenter re-checks whether the audience window is alive.
pub const CONNECTION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Refresh period of the timer display.
pub const TIMER_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A repeating deadline. Inactive until started.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next_due: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true once per elapsed period. Missed periods collapse into one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}
