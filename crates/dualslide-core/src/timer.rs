//! Presentation stopwatch.
//!
//! Elapsed time is always derived from the clock (`accumulated + (now -
//! started_at)`); ticks only refresh the display.

use crate::clock::{Duration, Instant};

/// Stopwatch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, Default)]
pub struct PresentationTimer {
    state: TimerState,
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl PresentationTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Start from zero, or resume if paused.
    pub fn start(&mut self, now: Instant) {
        match self.state {
            TimerState::Running => return,
            TimerState::Stopped => self.accumulated = Duration::ZERO,
            TimerState::Paused => {}
        }
        self.started_at = Some(now);
        self.state = TimerState::Running;
    }

    pub fn pause(&mut self, now: Instant) {
        if self.state != TimerState::Running {
            return;
        }
        self.accumulated = self.elapsed(now);
        self.started_at = None;
        self.state = TimerState::Paused;
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = None;
        self.state = TimerState::Stopped;
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.pause(now);
        } else {
            self.start(now);
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.state, self.started_at) {
            (TimerState::Running, Some(started)) => {
                self.accumulated + now.saturating_duration_since(started)
            }
            _ => self.accumulated,
        }
    }
}

/// Format as `MM:SS`, or `H:MM:SS` past the hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
