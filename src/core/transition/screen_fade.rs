//=========================================================================
// Screen Fade
//=========================================================================
//
// Fades a full-screen overlay to opaque while leaving the old mode, and
// back to transparent while entering the new one.
//
// Timeline (fade_time = D):
//
//   alpha 1 ┤        ╱╲
//           │      ╱    ╲
//   alpha 0 ┼────╱        ╲────
//           0   exit D/2  enter D/2
//
// Progress is driven by `FrameTime::elapsed`, so the effect lasts the same
// wall-clock time at any frame rate.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use super::Transition;
use crate::core::{FrameTime, Step};

//=== FadeSurface =========================================================

/// Overlay the fade draws on.
///
/// The fade takes ownership of the surface when it is constructed and
/// drops it once the enter phase completes, so renderer-side cleanup
/// belongs in the surface's `Drop` impl.
pub trait FadeSurface: Send {
    /// Sets the overlay opacity, `0.0` transparent to `1.0` opaque.
    fn set_alpha(&mut self, alpha: f32);
}

//=== Alpha Tween =========================================================

fn normalized_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }

    let elapsed = elapsed.as_secs_f32();
    let total = duration.as_secs_f32();
    (elapsed / total).clamp(0.0, 1.0)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Linear alpha interpolation that starts on its first resume.
#[derive(Debug, Clone)]
struct AlphaTween {
    from: f32,
    to: f32,
    duration: Duration,
    started_at: Option<Duration>,
}

impl AlphaTween {
    fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            started_at: None,
        }
    }

    /// Returns the alpha for `now` and whether the tween is still running.
    fn resume(&mut self, now: Duration) -> (f32, Step) {
        let start = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_sub(start);

        if elapsed < self.duration {
            let progress = normalized_progress(elapsed, self.duration);
            (lerp(self.from, self.to, progress), Step::Yield)
        } else {
            (self.to, Step::Done)
        }
    }
}

//=== ScreenFade ==========================================================

/// Fade-out / fade-in transition over a [`FadeSurface`].
///
/// Each phase takes half of the configured fade time.
///
/// ```rust
/// # use std::time::Duration;
/// # use aetheric_modes::prelude::*;
/// struct Overlay;
///
/// impl FadeSurface for Overlay {
///     fn set_alpha(&mut self, _alpha: f32) {}
/// }
///
/// let fade = ScreenFade::new(Duration::from_millis(500), Overlay);
/// assert_eq!(fade.phase_duration(), Duration::from_millis(250));
/// ```
pub struct ScreenFade {
    fade_time: Duration,
    surface: Option<Box<dyn FadeSurface>>,
    alpha: f32,
    fade_out: AlphaTween,
    fade_in: AlphaTween,
}

impl ScreenFade {
    /// Creates the fade and takes ownership of its overlay.
    pub fn new<S>(fade_time: Duration, surface: S) -> Self
    where
        S: FadeSurface + 'static,
    {
        let half = fade_time / 2;
        Self {
            fade_time,
            surface: Some(Box::new(surface)),
            alpha: 0.0,
            fade_out: AlphaTween::new(0.0, 1.0, half),
            fade_in: AlphaTween::new(1.0, 0.0, half),
        }
    }

    pub fn fade_time(&self) -> Duration {
        self.fade_time
    }

    /// Length of each of the two phases.
    pub fn phase_duration(&self) -> Duration {
        self.fade_time / 2
    }

    /// Last alpha written to the overlay.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Returns true until the enter phase has released the overlay.
    pub fn holds_surface(&self) -> bool {
        self.surface.is_some()
    }

    fn apply(&mut self, alpha: f32) {
        self.alpha = alpha;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_alpha(alpha);
        }
    }
}

impl Transition for ScreenFade {
    fn exit(&mut self, time: &FrameTime) -> Step {
        let (alpha, step) = self.fade_out.resume(time.elapsed);
        self.apply(alpha);
        step
    }

    fn enter(&mut self, time: &FrameTime) -> Step {
        let (alpha, step) = self.fade_in.resume(time.elapsed);
        self.apply(alpha);

        if step.is_done() && self.surface.take().is_some() {
            debug!("Screen fade finished, overlay released");
        }
        step
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
