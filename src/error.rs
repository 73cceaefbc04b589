//=========================================================================
// Errors
//=========================================================================
//
// Error types surfaced to collaborators. The scheduling loop itself never
// returns errors: contract violations are rejected at the point where a
// collaborator tries to commit them, and reported back to that caller.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::mode::HandoverRequest;

//=== HandoverError =======================================================

/// A handover request the engine refused to accept.
///
/// Every variant hands the rejected request back, so the emitting mode can
/// queue it for later or drop it (which releases the successor mode and
/// the transition it owns).
#[derive(Debug, Error)]
pub enum HandoverError {
    /// The mode is not current yet; the engine has not subscribed.
    #[error("no engine is subscribed to this mode's handover signal")]
    NotSubscribed(HandoverRequest),

    /// A request from this mode is already waiting for the engine.
    #[error("a handover request is already pending for this mode")]
    AlreadyPending(HandoverRequest),

    /// The engine accepted an earlier request and unsubscribed.
    #[error("the engine already accepted a handover from this mode")]
    Closed(HandoverRequest),
}

impl HandoverError {
    /// Recovers the rejected request.
    pub fn into_request(self) -> HandoverRequest {
        match self {
            Self::NotSubscribed(request)
            | Self::AlreadyPending(request)
            | Self::Closed(request) => request,
        }
    }
}

//=== HostError ===========================================================

/// Failure to deliver a control event to a running engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The engine has stopped and dropped its control channel.
    #[error("engine is no longer running")]
    Disconnected,

    /// The control channel is full; the engine is not draining it.
    #[error("engine control channel is full")]
    Backlogged,

    /// Time scales must lie within `0.0..=MAX_TIME_SCALE`.
    #[error("invalid time scale {0}")]
    InvalidTimeScale(f32),
}
