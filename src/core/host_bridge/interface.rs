//=========================================================================
// Host Bridge Interface
//=========================================================================
//
// Host-to-engine control events.
//
// Sent through `HostHandle` from any thread; applied by the engine at the
// start of the next frame, before the mode machine ticks.
//
//=========================================================================

//=== HostEvent ===========================================================

/// Control events sent from the host to the engine loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum HostEvent {
    /// Stop the engine after the current frame, whatever mode is running.
    Shutdown,

    /// Multiply future frame deltas by this factor (0.0 freezes timed effects).
    TimeScale(f32),
}
