//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_modes::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine
pub use crate::engine::{Engine, EngineBuilder, HostHandle, RunSummary, StopReason};

// Scheduling primitives
pub use crate::core::{FrameClock, FrameTime, Step, TickControl};

// Mode system
pub use crate::core::mode::{HandoverRequest, HandoverSignal, Mode, ModeLifecycle, ModeMachine};

// Transitions
pub use crate::core::transition::{CutTransition, FadeSurface, ScreenFade, Transition};

// Errors
pub use crate::error::{HandoverError, HostError};
