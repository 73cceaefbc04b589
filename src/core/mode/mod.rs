//=========================================================================
// Mode System
//=========================================================================
//
// Runs exactly one application mode at a time and hands control over
// between modes through two-phase transitions.
//
// Architecture:
//   ModeMachine
//     ├─ current: Box<dyn Mode>
//     ├─ subscription: HandoverSubscription  (single subscriber)
//     └─ phase: Running | Exiting | Entering | Finished
//
// Flow:
//   tick() → run_body() ... → HandoverSignal::emit()
//          → transition.exit() ... → end_exit() → swap
//          → transition.enter() ... → end_enter() → run_body() ...
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{FrameTime, Step};

//=== Module Declarations =================================================

mod handover;
mod machine;

//=== Public API ==========================================================

pub use handover::{HandoverRequest, HandoverSignal, HandoverSubscription};
pub use machine::ModeMachine;

//=== Mode Trait ==========================================================

/// A unit of application behavior driven by the [`ModeMachine`].
///
/// A mode owns its resources and its [`HandoverSignal`]. The machine
/// subscribes to the signal when the mode becomes current, then calls the
/// lifecycle hooks in a fixed order:
///
/// ```text
/// begin_enter → end_enter → run_body* → (handover) → end_exit
/// ```
///
/// For every mode but the initial one, `end_enter` is delayed until the
/// incoming transition's enter phase completes.
///
/// # Minimal Implementation
///
/// ```rust
/// # use aetheric_modes::prelude::*;
/// struct Idle {
///     signal: HandoverSignal,
/// }
///
/// impl Mode for Idle {
///     fn handover_signal(&mut self) -> &mut HandoverSignal {
///         &mut self.signal
///     }
///
///     fn run_body(&mut self, _time: &FrameTime) -> Step {
///         Step::Yield
///     }
/// }
/// ```
pub trait Mode: Send {
    /// Human-readable name used in log output.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// The signal this mode emits its single handover request through.
    fn handover_signal(&mut self) -> &mut HandoverSignal;

    /// Called once when the mode becomes current, before any body step.
    ///
    /// The handover signal is already subscribed at this point, so clones
    /// taken here can be handed to background work.
    fn begin_enter(&mut self) {}

    /// Called once when the mode is fully active.
    fn end_enter(&mut self) {}

    /// Resumes the mode's body by one step.
    ///
    /// Return `Step::Yield` to suspend until the next tick, or
    /// `Step::Done` once the mode has no autonomous work left. After
    /// `Done`, or once a handover has been observed, the machine never
    /// resumes the body of this instance again.
    fn run_body(&mut self, time: &FrameTime) -> Step;

    /// Called once after the outgoing transition's exit phase, right before
    /// the mode is dropped. Release what `begin_enter` acquired.
    fn end_exit(&mut self) {}
}

//=== Mode Lifecycle ======================================================

/// Lifecycle of the mode instance currently owned by the machine.
///
/// Every instance walks these states in order without skipping:
///
/// ```text
/// Created → Entering → Active → ExitSignaled → Exiting → Destroyed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeLifecycle {
    Created,
    Entering,
    Active,
    ExitSignaled,
    Exiting,
    Destroyed,
}

impl ModeLifecycle {
    /// The only state allowed to follow this one.
    pub fn successor(self) -> Option<ModeLifecycle> {
        match self {
            Self::Created => Some(Self::Entering),
            Self::Entering => Some(Self::Active),
            Self::Active => Some(Self::ExitSignaled),
            Self::ExitSignaled => Some(Self::Exiting),
            Self::Exiting => Some(Self::Destroyed),
            Self::Destroyed => None,
        }
    }
}

//=== Helpers =============================================================

pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct LobbyMode {
        signal: HandoverSignal,
    }

    impl Mode for LobbyMode {
        fn handover_signal(&mut self) -> &mut HandoverSignal {
            &mut self.signal
        }

        fn run_body(&mut self, _time: &FrameTime) -> Step {
            Step::Done
        }
    }

    #[test]
    fn default_name_is_short_type_name() {
        let mode = LobbyMode {
            signal: HandoverSignal::new(),
        };
        assert_eq!(mode.name(), "LobbyMode");
    }

    #[test]
    fn short_type_name_strips_paths_and_generics() {
        assert_eq!(short_type_name("a::b::Match<c::Team>"), "Match");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn lifecycle_walks_every_state_once() {
        let mut state = ModeLifecycle::Created;
        let mut visited = vec![state];
        while let Some(next) = state.successor() {
            visited.push(next);
            state = next;
        }

        assert_eq!(
            visited,
            vec![
                ModeLifecycle::Created,
                ModeLifecycle::Entering,
                ModeLifecycle::Active,
                ModeLifecycle::ExitSignaled,
                ModeLifecycle::Exiting,
                ModeLifecycle::Destroyed,
            ]
        );
    }
}
