//! # Frame Scheduling
//!
//! The platform draws a frame only when one has been requested, and each request is good for
//! exactly one frame. [`FrameScheduler`] tracks that single pending request so the application
//! can re-arm it at the end of every frame and revoke it before teardown. [`FrameClock`] turns
//! successive frames into wall-clock deltas.

use web_time::{Duration, Instant};

/// The single pending frame request.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: bool,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the next frame.
    ///
    /// Returns `true` if the platform must be asked for a redraw, i.e. no request was pending.
    pub fn arm(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Consumes the pending request. A `false` return means the frame must not run.
    pub fn fire(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Revokes the pending request. Safe to call any number of times; the next frame runs
    /// only after another [`arm`](Self::arm).
    pub fn cancel(&mut self) {
        self.pending = false;
    }
}

/// Measures the time between consecutive frames.
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Time since the previous tick (or since creation), restarting the measurement.
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Duration {
        let dt = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_consumes_one_request() {
        let mut scheduler = FrameScheduler::new();
        assert!(!scheduler.fire());

        assert!(scheduler.arm());
        assert!(!scheduler.arm());
        assert!(scheduler.fire());
        assert!(!scheduler.fire());
    }

    #[test]
    fn cancel_is_idempotent_and_blocks_the_frame() {
        let mut scheduler = FrameScheduler::new();
        scheduler.arm();
        scheduler.cancel();
        scheduler.cancel();
        assert!(!scheduler.fire());

        assert!(scheduler.arm());
        assert!(scheduler.fire());
    }

    #[test]
    fn clock_reports_elapsed_time_between_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock { last_tick: start };
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert_eq!(dt, Duration::from_millis(16));

        let dt = clock.tick_at(start + Duration::from_millis(40));
        assert_eq!(dt, Duration::from_millis(24));
    }
}
