//=========================================================================
// Frame Clock
//=========================================================================
//
// Converts wall-clock time into per-tick `FrameTime` snapshots.
//
// Architecture:
//   Instant::now() → raw delta → clamp(max_delta) → × time_scale
//                                                      ↓
//                                   FrameTime { tick, elapsed, delta }
//
// Timed effects read `FrameTime::elapsed` rather than counting ticks, so
// their duration does not depend on the frame rate. Offline drivers and
// tests build `FrameTime` values directly with `FrameTime::advance`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use log::warn;

//=== Constants ===========================================================

/// Largest accepted time scale.
pub const MAX_TIME_SCALE: f32 = 100.0;

//=== FrameTime ===========================================================

/// Time snapshot handed to modes and transitions for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Number of ticks completed before this one.
    pub tick: u64,

    /// Scaled time accumulated since the clock started.
    pub elapsed: Duration,

    /// Scaled time since the previous tick.
    pub delta: Duration,
}

impl FrameTime {
    /// Snapshot at an arbitrary point in time, with no delta.
    pub fn at(elapsed: Duration) -> Self {
        Self {
            tick: 0,
            elapsed,
            delta: Duration::ZERO,
        }
    }

    /// Returns the snapshot for the next tick, `delta` later.
    pub fn advance(&self, delta: Duration) -> Self {
        Self {
            tick: self.tick + 1,
            elapsed: self.elapsed.saturating_add(delta),
            delta,
        }
    }
}

//=== FrameClock ==========================================================

/// Wall-clock source of `FrameTime` snapshots.
///
/// Long stalls (debugger breaks, window drags) are clamped to
/// `max_delta` so timed effects do not jump straight to their end.
/// The time scale multiplies every delta; a scale of zero freezes
/// elapsed time while ticks keep counting.
pub struct FrameClock {
    last: Instant,
    current: FrameTime,
    max_delta: Duration,
    time_scale: f32,
}

impl FrameClock {
    /// Starts a clock at the current instant.
    pub fn start(max_delta: Duration) -> Self {
        Self {
            last: Instant::now(),
            current: FrameTime::default(),
            max_delta,
            time_scale: 1.0,
        }
    }

    /// Measures the time since the previous call and returns the new snapshot.
    pub fn advance(&mut self) -> FrameTime {
        let now = Instant::now();
        let raw = now.duration_since(self.last);
        self.last = now;

        let clamped = raw.min(self.max_delta);
        let scaled = scale_delta(clamped, self.time_scale, self.max_delta);
        self.current = self.current.advance(scaled);
        self.current
    }

    /// The most recent snapshot.
    pub fn now(&self) -> FrameTime {
        self.current
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the multiplier applied to every future delta.
    ///
    /// Values outside `0.0..=MAX_TIME_SCALE` (and NaN) are ignored.
    pub fn set_time_scale(&mut self, scale: f32) {
        if !is_valid_time_scale(scale) {
            warn!("Ignoring invalid time scale {}", scale);
            return;
        }
        self.time_scale = scale;
    }
}

/// Returns true if `scale` is finite and within `0.0..=MAX_TIME_SCALE`.
pub fn is_valid_time_scale(scale: f32) -> bool {
    (0.0..=MAX_TIME_SCALE).contains(&scale)
}

/// Multiplies `delta` by `scale`, falling back to `fallback` when the
/// product does not fit in a `Duration`.
fn scale_delta(delta: Duration, scale: f32, fallback: Duration) -> Duration {
    Duration::try_from_secs_f64(delta.as_secs_f64() * f64::from(scale)).unwrap_or_else(|_| {
        warn!("Scaled frame delta overflowed, using {:?}", fallback);
        fallback
    })
}

//=========================================================================
// Unit Tests
//=========================================================================
