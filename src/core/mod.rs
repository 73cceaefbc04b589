//=========================================================================
// Core Systems
//
// Cooperative execution primitives shared by modes, transitions and the
// mode machine that schedules them.
//
// Responsibilities:
// - Define the single-step resume protocol (`Step`)
// - Define the per-tick control signal handed back to the host (`TickControl`)
// - Expose the frame clock, mode, transition and host bridge subsystems
//
// Notes:
// Nothing in `core` spawns threads. The host drives everything by calling
// `ModeMachine::tick` once per frame; all suspension happens at the
// explicit `Step::Yield` points returned by modes and transitions.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod clock;
pub mod mode;
pub mod transition;

pub(crate) mod host_bridge;

//=== Public API ==========================================================

pub use clock::{is_valid_time_scale, FrameClock, FrameTime, MAX_TIME_SCALE};
pub use mode::{HandoverRequest, HandoverSignal, Mode, ModeLifecycle, ModeMachine};
pub use transition::{CutTransition, FadeSurface, ScreenFade, Transition};

//=== Step ================================================================

/// Result of resuming a cooperative routine by one step.
///
/// Mode bodies and transition phases are resumable routines: each call
/// runs until the next suspension point and reports what happened.
///
/// - `Yield`: a suspension point was reached. Resume again next tick.
/// - `Done`: the routine finished *without* suspending on this resume.
///   The caller moves on immediately, within the same tick.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Yield,
    Done,
}

impl Step {
    /// Returns true if the routine has finished.
    pub fn is_done(self) -> bool {
        self == Step::Done
    }
}

//=== TickControl =========================================================

/// Update loop control signal returned to the host after each tick.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    /// The machine suspended; call `tick` again next frame.
    Continue,

    /// The mode graph terminated; no mode is left to run.
    Exit,
}

//=========================================================================
// Unit Tests
//=========================================================================
