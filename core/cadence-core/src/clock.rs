//! Clock driver: turns wall-clock time into `tick` commands.
//!
//! Ticks carry the measured delta since the previous tick rather than a
//! fixed increment, so a host that gets throttled or suspended still counts
//! real time. The driver only delivers ticks while the session is RUNNING;
//! on resume the baseline restarts at "now" so paused time is never replayed.

use std::time::{Duration, Instant};

use crate::session::Session;
use crate::types::SessionStatus;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ClockDriver {
    interval: Duration,
    baseline: Option<Instant>,
}

impl Default for ClockDriver {
    fn default() -> Self {
        ClockDriver::new(DEFAULT_TICK_INTERVAL)
    }
}

impl ClockDriver {
    pub fn new(interval: Duration) -> Self {
        ClockDriver {
            interval: if interval.is_zero() {
                DEFAULT_TICK_INTERVAL
            } else {
                interval
            },
            baseline: None,
        }
    }

    /// How often the host should call [`ClockDriver::drive`].
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.baseline.is_some()
    }

    /// Starts or stops the driver to match the session status.
    pub fn sync(&mut self, status: SessionStatus, now: Instant) {
        match (status, self.baseline) {
            (SessionStatus::Running, None) => self.baseline = Some(now),
            (SessionStatus::Running, Some(_)) => {}
            (_, _) => self.baseline = None,
        }
    }

    /// Seconds since the previous poll, or `None` while stopped.
    pub fn poll(&mut self, now: Instant) -> Option<f64> {
        let previous = self.baseline?;
        self.baseline = Some(now);
        Some(now.saturating_duration_since(previous).as_secs_f64())
    }

    /// Delivers one tick to `session` if it is running. Returns whether a
    /// tick was sent.
    pub fn drive(&mut self, session: &mut Session, now: Instant) -> bool {
        self.sync(session.state().status, now);
        let Some(elapsed) = self.poll(now) else {
            return false;
        };
        if elapsed > 0.0 {
            session.tick(elapsed);
        }
        // The tick may have finished the workout.
        self.sync(session.state().status, now);
        true
    }
}
