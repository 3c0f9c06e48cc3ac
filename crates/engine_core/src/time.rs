//! Time management for the game loop.
//!
//! The simulation runs on a fixed tick driven from the platform's per-frame
//! callback. At most one tick runs per delivered frame; real time beyond one
//! tick interval is discarded instead of accumulated, so a slow device never
//! enters a catch-up spiral.

use std::time::{Duration, Instant};

/// Default tick interval (~60 Hz).
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// Frame timing plus the fixed-tick gate.
#[derive(Debug)]
pub struct FixedTicker {
    /// Time when the loop started.
    start_time: Instant,
    /// Time the last simulation tick ran.
    last_tick: Instant,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frames delivered since start.
    frame_count: u64,
    /// Ticks simulated since start.
    tick_count: u64,
    tick_interval: Duration,
    /// Whether the current frame should run a tick.
    tick_due: bool,
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl FixedTicker {
    pub fn new(tick_interval: Duration) -> Self {
        Self::starting_at(Instant::now(), tick_interval)
    }

    /// Create a ticker with an explicit start instant (used by tests).
    pub fn starting_at(now: Instant, tick_interval: Duration) -> Self {
        Self {
            start_time: now,
            last_tick: now,
            elapsed: Duration::ZERO,
            frame_count: 0,
            tick_count: 0,
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            tick_due: false,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Update timing for a frame delivered at `now`.
    pub fn update_at(&mut self, now: Instant) {
        self.elapsed = now.saturating_duration_since(self.start_time);
        self.frame_count += 1;

        self.tick_due = now.saturating_duration_since(self.last_tick) >= self.tick_interval;
        if self.tick_due {
            // Surplus beyond one interval is dropped on purpose.
            self.last_tick = now;
            self.tick_count += 1;
        }
    }

    /// True when the frame passed to the last `update` should run `tick()`.
    pub fn should_tick(&self) -> bool {
        self.tick_due
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Tracks the single outstanding per-frame callback request.
///
/// Re-arming while a request is already pending is a no-op, so state changes
/// can call [`FrameSchedule::arm`] freely without stacking callbacks.
#[derive(Debug, Default)]
pub struct FrameSchedule {
    pending: bool,
    cancelled: bool,
}

impl FrameSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the caller must issue a platform frame request.
    pub fn arm(&mut self) -> bool {
        if self.pending || self.cancelled {
            return false;
        }
        self.pending = true;
        true
    }

    /// Called from the frame callback. Returns false when the schedule was cancelled.
    pub fn fire(&mut self) -> bool {
        self.pending = false;
        !self.cancelled
    }

    /// Stop scheduling for good (teardown).
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.pending = false;
    }
}
