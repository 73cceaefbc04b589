//=========================================================================
// Transitions
//=========================================================================
//
// Two-phase effects run by the mode machine between an outgoing and an
// incoming mode.
//
// Flow:
//   exit()*  → outgoing.end_exit() → swap → enter()* → incoming.end_enter()
//
// Both phases are resumed once per tick until they report `Step::Done`.
// The machine never aborts a phase, so every implementation must finish on
// its own within a bounded amount of time; a phase that never completes
// stalls the machine indefinitely.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::mode::short_type_name;
use super::{FrameTime, Step};

//=== Module Declarations =================================================

mod screen_fade;

//=== Public API ==========================================================

pub use screen_fade::{FadeSurface, ScreenFade};

//=== Transition Trait ====================================================

/// A time-extended exit/enter effect between two modes.
///
/// A transition is built by the mode that requests the handover and is
/// consumed by the machine exactly once. Resources acquired in the
/// constructor must be released by the end of [`Transition::enter`], or
/// on drop when the machine shuts down without an enter phase.
pub trait Transition: Send {
    /// Human-readable name used in log output.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Resumes the exit effect by one step.
    fn exit(&mut self, time: &FrameTime) -> Step;

    /// Resumes the enter effect by one step.
    fn enter(&mut self, time: &FrameTime) -> Step;
}

//=== CutTransition =======================================================

/// Switches modes instantly: both phases finish without yielding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CutTransition;

impl Transition for CutTransition {
    fn exit(&mut self, _time: &FrameTime) -> Step {
        Step::Done
    }

    fn enter(&mut self, _time: &FrameTime) -> Step {
        Step::Done
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
