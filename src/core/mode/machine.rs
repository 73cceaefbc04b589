//=========================================================================
// Mode Machine
//=========================================================================
//
// Cooperative scheduler that owns the current mode and drives handovers.
//
// Phases:
//
//   Running ──signal──> Signaled ──> Exiting ──exit done──> Entering ──┐
//      ↑                               │                              │
//      │                               └─ no next mode ──> Finished   │
//      └──────────────────────────────────────────── enter done ──────┘
//
// Each `tick()` resumes the active routine until it yields or the machine
// finishes. Routines that complete without yielding hand control to the
// next phase within the same tick. A signal raised during a body step that
// then yields is taken at that step boundary; the exit phase starts on
// the following tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::mem;

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::{HandoverRequest, HandoverSignal, HandoverSubscription, Mode, ModeLifecycle};
use crate::core::transition::Transition;
use crate::core::{FrameTime, Step, TickControl};

//=== Phase ===============================================================

/// Scheduler position. A pending handover lives entirely inside
/// `Exiting`, so successor and transition are always set together.
enum Phase {
    /// Pulling body steps from the current mode.
    Running { body_finished: bool },

    /// Request taken; the exit phase has not started yet.
    Signaled { request: HandoverRequest },

    /// Draining the transition's exit effect.
    Exiting {
        next: Option<Box<dyn Mode>>,
        transition: Box<dyn Transition>,
    },

    /// Draining the transition's enter effect for the new current mode.
    Entering { transition: Box<dyn Transition> },

    /// No mode left to run.
    Finished,
}

//=== Retired =============================================================

/// Stands in for a mode destroyed on the shutdown path, keeping only its
/// name.
struct Retired {
    name: String,
    signal: HandoverSignal,
}

impl Mode for Retired {
    fn name(&self) -> &str {
        &self.name
    }

    fn handover_signal(&mut self) -> &mut HandoverSignal {
        &mut self.signal
    }

    fn run_body(&mut self, _time: &FrameTime) -> Step {
        Step::Done
    }
}

//=== ModeMachine =========================================================

/// Runs one mode at a time and performs handovers between them.
///
/// The machine subscribes to the current mode's handover signal and
/// honors the first request only: the subscription is closed the moment
/// the request is taken, so later emits from the same mode are rejected
/// at the signal.
///
/// # Example
///
/// ```rust
/// # use aetheric_modes::prelude::*;
/// struct Splash {
///     signal: HandoverSignal,
///     frames: u32,
/// }
///
/// impl Mode for Splash {
///     fn handover_signal(&mut self) -> &mut HandoverSignal {
///         &mut self.signal
///     }
///
///     fn run_body(&mut self, _time: &FrameTime) -> Step {
///         self.frames += 1;
///         if self.frames == 3 {
///             let _ = self.signal.emit(HandoverRequest::shutdown(CutTransition));
///         }
///         Step::Yield
///     }
/// }
///
/// let mut machine = ModeMachine::new(Splash { signal: HandoverSignal::new(), frames: 0 });
/// let mut time = FrameTime::default();
/// while machine.tick(&time) == TickControl::Continue {
///     time = time.advance(std::time::Duration::from_millis(16));
/// }
/// assert!(machine.is_finished());
/// ```
pub struct ModeMachine {
    current: Box<dyn Mode>,
    lifecycle: ModeLifecycle,
    subscription: Option<HandoverSubscription>,
    phase: Phase,
    handovers: u64,
    #[cfg(test)]
    history: Vec<(String, ModeLifecycle)>,
}

impl ModeMachine {
    //--- Construction -----------------------------------------------------

    /// Creates the machine and fully enters `initial`.
    ///
    /// `begin_enter` and `end_enter` run immediately, since no transition
    /// precedes the first mode.
    pub fn new<M>(initial: M) -> Self
    where
        M: Mode + 'static,
    {
        Self::from_boxed(Box::new(initial))
    }

    /// Same as [`ModeMachine::new`] for an already boxed mode.
    pub fn from_boxed(mut initial: Box<dyn Mode>) -> Self {
        info!("Starting mode machine with initial mode {}", initial.name());

        let subscription = initial.handover_signal().subscribe();
        let mut machine = Self {
            current: initial,
            lifecycle: ModeLifecycle::Created,
            subscription: Some(subscription),
            phase: Phase::Running {
                body_finished: false,
            },
            handovers: 0,
            #[cfg(test)]
            history: Vec::new(),
        };
        machine.record_lifecycle();

        machine.set_lifecycle(ModeLifecycle::Entering);
        machine.current.begin_enter();
        machine.current.end_enter();
        machine.set_lifecycle(ModeLifecycle::Active);
        machine
    }

    //--- Queries ----------------------------------------------------------

    /// Name of the current mode, or of the last one once the machine has
    /// finished.
    pub fn current_mode_name(&self) -> &str {
        self.current.name()
    }

    pub fn lifecycle(&self) -> ModeLifecycle {
        self.lifecycle
    }

    /// Number of completed handovers (enter phase finished).
    pub fn handovers(&self) -> u64 {
        self.handovers
    }

    /// Returns true while a transition's exit or enter phase is in flight.
    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Exiting { .. } | Phase::Entering { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    //--- Update Loop ------------------------------------------------------

    /// Advances the machine to its next suspension point.
    ///
    /// Returns `TickControl::Exit` once a mode handed over to no successor;
    /// every later call returns `Exit` as well.
    pub fn tick(&mut self, time: &FrameTime) -> TickControl {
        loop {
            let phase = mem::replace(&mut self.phase, Phase::Finished);

            match phase {
                Phase::Running { body_finished } => {
                    if let Some(request) = self.take_handover() {
                        self.begin_handover(request);
                        continue;
                    }

                    if body_finished {
                        // Parked until the mode signals.
                        self.phase = Phase::Running { body_finished };
                        return TickControl::Continue;
                    }

                    match self.current.run_body(time) {
                        Step::Yield => {
                            self.phase = Phase::Running {
                                body_finished: false,
                            };
                            if let Some(request) = self.take_handover() {
                                self.begin_handover(request);
                            }
                            return TickControl::Continue;
                        }
                        Step::Done => {
                            debug!("Body of {} finished", self.current.name());
                            self.phase = Phase::Running {
                                body_finished: true,
                            };
                        }
                    }
                }

                Phase::Signaled { request } => {
                    self.set_lifecycle(ModeLifecycle::Exiting);
                    let (next, transition) = request.into_parts();
                    self.phase = Phase::Exiting { next, transition };
                }

                Phase::Exiting {
                    next,
                    mut transition,
                } => {
                    if transition.exit(time) == Step::Yield {
                        self.phase = Phase::Exiting { next, transition };
                        return TickControl::Continue;
                    }

                    self.current.end_exit();
                    self.set_lifecycle(ModeLifecycle::Destroyed);

                    match next {
                        Some(next) => {
                            self.install(next);
                            self.phase = Phase::Entering { transition };
                        }
                        None => {
                            info!("Mode {} exited with no successor, stopping", self.current.name());
                            self.retire();
                            return TickControl::Exit;
                        }
                    }
                }

                Phase::Entering { mut transition } => {
                    if transition.enter(time) == Step::Yield {
                        self.phase = Phase::Entering { transition };
                        return TickControl::Continue;
                    }

                    drop(transition);
                    self.current.end_enter();
                    self.set_lifecycle(ModeLifecycle::Active);
                    self.handovers += 1;

                    self.phase = Phase::Running {
                        body_finished: false,
                    };
                }

                Phase::Finished => return TickControl::Exit,
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn take_handover(&mut self) -> Option<HandoverRequest> {
        self.subscription.as_ref().and_then(HandoverSubscription::poll)
    }

    fn begin_handover(&mut self, request: HandoverRequest) {
        self.set_lifecycle(ModeLifecycle::ExitSignaled);

        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }

        info!(
            "Handover from {} to {} via {}",
            self.current.name(),
            request.next_name().unwrap_or("<none>"),
            request.transition_name()
        );

        self.phase = Phase::Signaled { request };
    }

    fn retire(&mut self) {
        let retired = Retired {
            name: self.current.name().to_string(),
            signal: HandoverSignal::new(),
        };
        let previous = mem::replace(&mut self.current, Box::new(retired));
        debug!("Dropping mode {}", previous.name());
        drop(previous);
    }

    fn install(&mut self, mut next: Box<dyn Mode>) {
        let subscription = next.handover_signal().subscribe();
        let previous = mem::replace(&mut self.current, next);
        debug!("Dropping mode {}", previous.name());
        drop(previous);

        self.subscription = Some(subscription);
        self.lifecycle = ModeLifecycle::Created;
        self.record_lifecycle();
        self.set_lifecycle(ModeLifecycle::Entering);
        self.current.begin_enter();
    }

    fn set_lifecycle(&mut self, lifecycle: ModeLifecycle) {
        debug_assert_eq!(self.lifecycle.successor(), Some(lifecycle));
        debug!(
            "Mode {}: {:?} -> {:?}",
            self.current.name(),
            self.lifecycle,
            lifecycle
        );
        self.lifecycle = lifecycle;
        self.record_lifecycle();
    }

    #[cfg(test)]
    fn record_lifecycle(&mut self) {
        self.history
            .push((self.current.name().to_string(), self.lifecycle));
    }

    #[cfg(not(test))]
    fn record_lifecycle(&mut self) {}
}

//=========================================================================
// Unit Tests
//=========================================================================
