//=========================================================================
// Handover Signal
//=========================================================================
//
// One-shot, single-subscriber channel a mode uses to ask the machine to
// hand control to its successor.
//
// Architecture:
//   Mode ── HandoverSignal::emit() ──> bounded(1) ──> HandoverSubscription
//                 (clonable, Send)                      (owned by machine)
//
// The channel holds at most one request. The machine takes it at a step
// boundary and closes the channel under the same lock, so any later emit
// from the same mode, on any thread, is rejected with
// `HandoverError::Closed`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::Mode;
use crate::core::transition::Transition;
use crate::error::HandoverError;

//=== Handover Request ====================================================

/// A mode's request to hand control to `next` through `transition`.
///
/// A request without a next mode is the shutdown path: once the current
/// mode has exited, the machine stops.
pub struct HandoverRequest {
    next: Option<Box<dyn Mode>>,
    transition: Box<dyn Transition>,
}

impl HandoverRequest {
    /// Hands over to `next` through `transition`.
    pub fn to<M, T>(next: M, transition: T) -> Self
    where
        M: Mode + 'static,
        T: Transition + 'static,
    {
        Self::new(Some(Box::new(next)), Box::new(transition))
    }

    /// Exits the current mode through `transition` and stops the machine.
    pub fn shutdown<T>(transition: T) -> Self
    where
        T: Transition + 'static,
    {
        Self::new(None, Box::new(transition))
    }

    pub fn new(next: Option<Box<dyn Mode>>, transition: Box<dyn Transition>) -> Self {
        Self { next, transition }
    }

    /// Returns true if no mode follows this handover.
    pub fn is_shutdown(&self) -> bool {
        self.next.is_none()
    }

    /// Name of the requested successor, if any.
    pub fn next_name(&self) -> Option<&str> {
        self.next.as_deref().map(|mode| mode.name())
    }

    pub fn transition_name(&self) -> &str {
        self.transition.name()
    }

    pub(crate) fn into_parts(self) -> (Option<Box<dyn Mode>>, Box<dyn Transition>) {
        (self.next, self.transition)
    }
}

impl fmt::Debug for HandoverRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoverRequest")
            .field("next", &self.next_name())
            .field("transition", &self.transition_name())
            .finish()
    }
}

//=== Handover Slot =======================================================

/// Channel state shared by every clone of a signal and its subscription.
///
/// Sends and the close that follows a successful take both happen under
/// this lock, so no request can land after the machine accepted one.
#[derive(Default)]
enum Slot {
    #[default]
    Unsubscribed,
    Open(Sender<HandoverRequest>),
    Closed,
}

type SharedSlot = Arc<Mutex<Slot>>;

fn lock(slot: &SharedSlot) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

//=== Handover Signal =====================================================

/// Emitting half of a mode's handover channel.
///
/// Owned by the mode; the machine subscribes when the mode becomes
/// current. Clones share the same channel, so a clone can be moved into a
/// network callback or worker thread at any time.
#[derive(Clone, Default)]
pub struct HandoverSignal {
    slot: SharedSlot,
}

impl HandoverSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the single subscriber, replacing any earlier one.
    pub(crate) fn subscribe(&mut self) -> HandoverSubscription {
        let (sender, receiver) = bounded(1);
        *lock(&self.slot) = Slot::Open(sender);
        HandoverSubscription {
            slot: Arc::clone(&self.slot),
            receiver,
        }
    }

    /// Sends the mode's handover request to the machine.
    ///
    /// At most one request per mode is ever accepted, and `Ok` means the
    /// machine will act on it. Rejected requests are logged and returned
    /// inside the error.
    pub fn emit(&self, request: HandoverRequest) -> Result<(), HandoverError> {
        let slot = lock(&self.slot);

        let sender = match &*slot {
            Slot::Open(sender) => sender,
            Slot::Unsubscribed => {
                warn!("Handover {:?} emitted before the mode became current", request);
                return Err(HandoverError::NotSubscribed(request));
            }
            Slot::Closed => {
                warn!("Ignoring handover {:?}: mode is already exiting", request);
                return Err(HandoverError::Closed(request));
            }
        };

        match sender.try_send(request) {
            Ok(()) => {
                debug!("Handover request queued");
                Ok(())
            }
            Err(TrySendError::Full(request)) => {
                warn!("Ignoring second handover {:?}: one is already pending", request);
                Err(HandoverError::AlreadyPending(request))
            }
            Err(TrySendError::Disconnected(request)) => {
                warn!("Ignoring handover {:?}: mode is already exiting", request);
                Err(HandoverError::Closed(request))
            }
        }
    }

    /// Returns true while a machine is listening on this signal.
    pub fn is_subscribed(&self) -> bool {
        matches!(*lock(&self.slot), Slot::Open(_))
    }
}

impl fmt::Debug for HandoverSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoverSignal")
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

//=== Handover Subscription ===============================================

/// Receiving half of a mode's handover channel, owned by the machine.
pub struct HandoverSubscription {
    slot: SharedSlot,
    receiver: Receiver<HandoverRequest>,
}

impl HandoverSubscription {
    /// Takes the pending request, if one has been emitted.
    ///
    /// Taking a request closes the channel in the same critical section,
    /// so every later emit fails with `HandoverError::Closed`.
    pub fn poll(&self) -> Option<HandoverRequest> {
        let mut slot = lock(&self.slot);
        let request = self.receiver.try_recv().ok()?;
        *slot = Slot::Closed;
        Some(request)
    }

    /// Closes the channel without taking a request.
    pub fn unsubscribe(self) {
        let mut slot = lock(&self.slot);
        *slot = Slot::Closed;
        while let Ok(stray) = self.receiver.try_recv() {
            warn!("Discarding unaccepted handover {:?}", stray);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
