//=========================================================================
// Aetheric Modes — Library Root
//
// This crate runs exactly one application mode at a time (lobby, match,
// results, ...) and drives the controlled handover between modes.
//
// Responsibilities:
// - Expose the host-facing engine (`Engine`, `EngineBuilder`)
// - Expose the mode / transition contracts and the `ModeMachine`
//   scheduler for hosts that own their frame loop
// - Keep the host control channel internal
//
// Typical usage:
// ```no_run
// use aetheric_modes::prelude::*;
//
// # struct Lobby { signal: HandoverSignal }
// # impl Mode for Lobby {
// #     fn handover_signal(&mut self) -> &mut HandoverSignal { &mut self.signal }
// #     fn run_body(&mut self, _time: &FrameTime) -> Step { Step::Yield }
// # }
// fn main() {
//     EngineBuilder::new()
//         .build(Lobby { signal: HandoverSignal::new() })
//         .run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the scheduling primitives: frame clock, modes,
// transitions and the mode machine. Hosts with their own frame loop use
// `core::ModeMachine` directly instead of `Engine`.
//
pub mod core;
pub mod error;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` defines the fixed-rate host driver.
//
mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, HostHandle, RunSummary, StopReason};
