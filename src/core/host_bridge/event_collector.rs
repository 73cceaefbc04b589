//=========================================================================
// Event Collector
//=========================================================================
//
// Host event collector with bounded draining and shutdown detection.
//
// Architecture:
//   Receiver<HostEvent> → collect_frame() → FrameClock / TickControl
//
// Bounded draining keeps a flooded channel from starving the frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{info, warn};

//=== Internal Dependencies ===============================================

use super::HostEvent;
use crate::core::{FrameClock, TickControl};

//=== EventCollector ======================================================

/// Drains pending host events once per frame.
pub(crate) struct EventCollector {
    receiver: Receiver<HostEvent>,
}

impl EventCollector {
    pub(crate) const MAX_EVENTS_PER_FRAME: usize = 64;

    pub(crate) fn new(receiver: Receiver<HostEvent>) -> Self {
        Self { receiver }
    }

    /// Applies pending host events (bounded to prevent starvation).
    pub(crate) fn collect_frame(&mut self, clock: &mut FrameClock) -> TickControl {
        let mut drained = 0;

        while drained < Self::MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => {
                    drained += 1;
                    if Self::handle_event(event, clock) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if drained >= Self::MAX_EVENTS_PER_FRAME {
            warn!("Host event backlog: drained {} events this frame", drained);
        }

        TickControl::Continue
    }

    fn handle_event(event: HostEvent, clock: &mut FrameClock) -> TickControl {
        match event {
            HostEvent::Shutdown => {
                info!("Shutdown requested by host");
                TickControl::Exit
            }
            HostEvent::TimeScale(scale) => {
                info!("Time scale set to {}", scale);
                clock.set_time_scale(scale);
                TickControl::Continue
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    fn clock() -> FrameClock {
        FrameClock::start(Duration::from_millis(250))
    }

    #[test]
    fn collect_handles_empty_queue() {
        let (_tx, rx) = unbounded::<HostEvent>();
        let mut collector = EventCollector::new(rx);

        assert_eq!(collector.collect_frame(&mut clock()), TickControl::Continue);
    }

    #[test]
    fn collect_applies_time_scale() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);
        let mut clock = clock();

        tx.send(HostEvent::TimeScale(0.5)).unwrap();
        tx.send(HostEvent::TimeScale(2.0)).unwrap();

        assert_eq!(collector.collect_frame(&mut clock), TickControl::Continue);
        assert_eq!(clock.time_scale(), 2.0);
    }

    #[test]
    fn collect_returns_exit_on_shutdown() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(HostEvent::Shutdown).unwrap();

        assert_eq!(collector.collect_frame(&mut clock()), TickControl::Exit);
    }

    #[test]
    fn collect_is_bounded_per_frame() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);
        let mut clock = clock();

        for _ in 0..EventCollector::MAX_EVENTS_PER_FRAME {
            tx.send(HostEvent::TimeScale(1.0)).unwrap();
        }
        tx.send(HostEvent::Shutdown).unwrap();

        assert_eq!(collector.collect_frame(&mut clock), TickControl::Continue);
        assert_eq!(collector.collect_frame(&mut clock), TickControl::Exit);
    }

    #[test]
    fn collect_continues_after_disconnect() {
        let (tx, rx) = unbounded::<HostEvent>();
        let mut collector = EventCollector::new(rx);

        drop(tx);

        assert_eq!(collector.collect_frame(&mut clock()), TickControl::Continue);
    }
}
