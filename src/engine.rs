//=========================================================================
// Aetheric Modes Engine
//
// Host driver: runs the mode machine at a fixed tick rate on the calling
// thread until the mode graph ends or the host asks it to stop.
//
// Architecture:
// ```text
//     EngineBuilder  ──build(mode)──>  Engine  ──run()──>  RunSummary
//         │                              │
//         ├─ with_tps()                  ├─ host_handle() ──> HostHandle
//         ├─ with_channel_capacity()     │                     (any thread)
//         ├─ with_max_frame_delta()      └─ per frame:
//         └─ with_tick_limit()               host events → clock → tick
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Sender, TrySendError};
use log::info;

//=== Internal Dependencies ===============================================

use crate::core::host_bridge::{EventCollector, HostEvent};
use crate::core::{is_valid_time_scale, FrameClock, Mode, ModeMachine, TickControl};
use crate::error::HostError;

//=== Defaults ============================================================

const DEFAULT_TPS: f64 = 60.0;
const DEFAULT_CHANNEL_CAPACITY: usize = 16;
const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (machine ticks per second)
/// - **Channel capacity**: 16 host events
/// - **Max frame delta**: 250 ms
/// - **Tick limit**: none
///
/// # Examples
///
/// ```no_run
/// # use aetheric_modes::prelude::*;
/// # struct Lobby { signal: HandoverSignal }
/// # impl Mode for Lobby {
/// #     fn handover_signal(&mut self) -> &mut HandoverSignal { &mut self.signal }
/// #     fn run_body(&mut self, _time: &FrameTime) -> Step { Step::Yield }
/// # }
/// let summary = EngineBuilder::new()
///     .with_tps(120.0)
///     .build(Lobby { signal: HandoverSignal::new() })
///     .run();
///
/// println!("stopped after {} ticks: {:?}", summary.ticks, summary.reason);
/// ```
pub struct EngineBuilder {
    tps: f64,
    channel_capacity: usize,
    max_frame_delta: Duration,
    tick_limit: Option<u64>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: DEFAULT_TPS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            tick_limit: None,
        }
    }

    /// Sets the target ticks per second.
    ///
    /// Timed transitions read wall-clock time, so this only changes how
    /// often modes are resumed, not how long effects last.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the host → engine control channel.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Caps the delta a single frame may report after a stall.
    ///
    /// # Panics
    ///
    /// Panics if `max_delta` is zero.
    pub fn with_max_frame_delta(mut self, max_delta: Duration) -> Self {
        assert!(!max_delta.is_zero(), "Max frame delta must be positive");
        self.max_frame_delta = max_delta;
        self
    }

    /// Stops the run after `ticks` machine ticks.
    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    /// Builds the engine around its initial mode.
    ///
    /// The mode machine is created here, so `begin_enter` and `end_enter`
    /// of `initial` have run by the time this returns.
    pub fn build<M>(self, initial: M) -> Engine
    where
        M: Mode + 'static,
    {
        info!(
            "Building engine (TPS: {}, channel: {})",
            self.tps, self.channel_capacity
        );

        let (sender, receiver) = bounded(self.channel_capacity);

        Engine {
            machine: ModeMachine::new(initial),
            collector: EventCollector::new(receiver),
            sender,
            tps: self.tps,
            max_frame_delta: self.max_frame_delta,
            tick_limit: self.tick_limit,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== HostHandle ==========================================================

/// Thread-safe remote control for a running [`Engine`].
#[derive(Debug, Clone)]
pub struct HostHandle {
    sender: Sender<HostEvent>,
}

impl HostHandle {
    /// Asks the engine to stop after its current frame.
    pub fn request_shutdown(&self) -> Result<(), HostError> {
        self.send(HostEvent::Shutdown)
    }

    /// Scales the time fed to modes and transitions from the next frame on.
    pub fn set_time_scale(&self, scale: f32) -> Result<(), HostError> {
        if !is_valid_time_scale(scale) {
            return Err(HostError::InvalidTimeScale(scale));
        }
        self.send(HostEvent::TimeScale(scale))
    }

    fn send(&self, event: HostEvent) -> Result<(), HostError> {
        self.sender.try_send(event).map_err(|err| match err {
            TrySendError::Full(_) => HostError::Backlogged,
            TrySendError::Disconnected(_) => HostError::Disconnected,
        })
    }
}

//=== RunSummary ==========================================================

/// Why [`Engine::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A mode handed over to no successor.
    ModesFinished,

    /// The host called [`HostHandle::request_shutdown`].
    ShutdownRequested,

    /// The configured tick limit was reached.
    TickLimit,
}

/// Outcome of a completed [`Engine::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub handovers: u64,
    pub reason: StopReason,
    pub final_mode: String,
}

//=== Engine ==============================================================

/// Fixed-rate host loop around a [`ModeMachine`].
///
/// # Frame Pipeline
///
/// ```text
/// 1. Drain host events   (shutdown, time scale)
/// 2. Advance FrameClock  (wall clock, clamped, scaled)
/// 3. ModeMachine::tick   (one cooperative step)
/// 4. Sleep               (keep the fixed pace)
/// ```
pub struct Engine {
    machine: ModeMachine,
    collector: EventCollector,
    sender: Sender<HostEvent>,
    tps: f64,
    max_frame_delta: Duration,
    tick_limit: Option<u64>,
}

impl Engine {
    /// Returns a handle for controlling the engine from other threads.
    pub fn host_handle(&self) -> HostHandle {
        HostHandle {
            sender: self.sender.clone(),
        }
    }

    /// The mode machine, for inspection before the run starts.
    pub fn machine(&self) -> &ModeMachine {
        &self.machine
    }

    //--- Execution --------------------------------------------------------

    /// Runs on the calling thread until the engine stops.
    pub fn run(self) -> RunSummary {
        info!("Starting engine runtime (TPS: {})", self.tps);

        let Engine {
            mut machine,
            mut collector,
            tps,
            max_frame_delta,
            tick_limit,
            ..
        } = self;

        let frame_duration = Duration::from_secs_f64(1.0 / tps);
        let mut clock = FrameClock::start(max_frame_delta);
        let mut ticks: u64 = 0;

        let reason = loop {
            let frame_start = Instant::now();

            //--- Step 1: Apply host events -----------------------------
            if collector.collect_frame(&mut clock) == TickControl::Exit {
                break StopReason::ShutdownRequested;
            }

            if tick_limit.is_some_and(|limit| ticks >= limit) {
                break StopReason::TickLimit;
            }

            //--- Step 2: Tick the mode machine -------------------------
            let time = clock.advance();
            ticks += 1;

            if machine.tick(&time) == TickControl::Exit {
                break StopReason::ModesFinished;
            }

            //--- Step 3: Maintain fixed pacing -------------------------
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        };

        info!(
            "Engine stopped after {} ticks ({:?}, {} handovers)",
            ticks,
            reason,
            machine.handovers()
        );

        RunSummary {
            ticks,
            handovers: machine.handovers(),
            reason,
            final_mode: machine.current_mode_name().to_string(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CutTransition, FrameTime, HandoverRequest, HandoverSignal, Step};

    struct Countdown {
        signal: HandoverSignal,
        remaining: u32,
    }

    impl Countdown {
        fn new(remaining: u32) -> Self {
            Self {
                signal: HandoverSignal::new(),
                remaining,
            }
        }
    }

    impl Mode for Countdown {
        fn handover_signal(&mut self) -> &mut HandoverSignal {
            &mut self.signal
        }

        fn run_body(&mut self, _time: &FrameTime) -> Step {
            if self.remaining == 0 {
                let _ = self.signal.emit(HandoverRequest::shutdown(CutTransition));
            } else {
                self.remaining -= 1;
            }
            Step::Yield
        }
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();
        assert_eq!(builder.tps, 60.0);
        assert_eq!(builder.channel_capacity, 16);
        assert_eq!(builder.max_frame_delta, Duration::from_millis(250));
        assert_eq!(builder.tick_limit, None);
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let builder = EngineBuilder::new()
            .with_tps(120.0)
            .with_channel_capacity(4)
            .with_max_frame_delta(Duration::from_millis(50))
            .with_tick_limit(10);

        assert_eq!(builder.tps, 120.0);
        assert_eq!(builder.channel_capacity, 4);
        assert_eq!(builder.max_frame_delta, Duration::from_millis(50));
        assert_eq!(builder.tick_limit, Some(10));
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_zero() {
        EngineBuilder::new().with_tps(0.0);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::new().with_channel_capacity(0);
    }

    #[test]
    #[should_panic(expected = "Max frame delta must be positive")]
    fn builder_with_zero_frame_delta_panics() {
        EngineBuilder::new().with_max_frame_delta(Duration::ZERO);
    }

    #[test]
    fn build_enters_initial_mode() {
        let engine = EngineBuilder::new().build(Countdown::new(1));
        assert_eq!(engine.machine().current_mode_name(), "Countdown");
        assert_eq!(
            engine.machine().lifecycle(),
            crate::core::ModeLifecycle::Active
        );
    }

    //=====================================================================
    // Engine Tests
    //=====================================================================

    #[test]
    fn run_stops_when_modes_finish() {
        let summary = EngineBuilder::new()
            .with_tps(1000.0)
            .build(Countdown::new(2))
            .run();

        assert_eq!(summary.reason, StopReason::ModesFinished);
        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.handovers, 0);
        assert_eq!(summary.final_mode, "Countdown");
    }

    #[test]
    fn run_honors_tick_limit() {
        let summary = EngineBuilder::new()
            .with_tps(1000.0)
            .with_tick_limit(5)
            .build(Countdown::new(u32::MAX))
            .run();

        assert_eq!(summary.reason, StopReason::TickLimit);
        assert_eq!(summary.ticks, 5);
    }

    #[test]
    fn shutdown_request_stops_before_next_tick() {
        let engine = EngineBuilder::new().build(Countdown::new(u32::MAX));
        engine.host_handle().request_shutdown().unwrap();

        let summary = engine.run();

        assert_eq!(summary.reason, StopReason::ShutdownRequested);
        assert_eq!(summary.ticks, 0);
    }

    #[test]
    fn handle_reports_disconnect_after_run() {
        let engine = EngineBuilder::new()
            .with_tick_limit(0)
            .build(Countdown::new(u32::MAX));
        let handle = engine.host_handle();

        engine.run();

        assert_eq!(handle.request_shutdown(), Err(HostError::Disconnected));
    }

    #[test]
    fn handle_rejects_invalid_time_scale() {
        let engine = EngineBuilder::new().build(Countdown::new(0));
        let handle = engine.host_handle();

        assert_eq!(
            handle.set_time_scale(-2.0),
            Err(HostError::InvalidTimeScale(-2.0))
        );
        assert!(handle.set_time_scale(0.5).is_ok());
    }

    #[test]
    fn handle_rejects_time_scale_beyond_duration_range() {
        let engine = EngineBuilder::new().build(Countdown::new(0));
        let handle = engine.host_handle();

        assert_eq!(
            handle.set_time_scale(f32::MAX),
            Err(HostError::InvalidTimeScale(f32::MAX))
        );
        assert_eq!(
            handle.set_time_scale(1e30),
            Err(HostError::InvalidTimeScale(1e30))
        );
    }

    #[test]
    fn run_survives_largest_time_scale() {
        let engine = EngineBuilder::new()
            .with_tps(1000.0)
            .with_max_frame_delta(Duration::MAX)
            .with_tick_limit(3)
            .build(Countdown::new(u32::MAX));
        engine
            .host_handle()
            .set_time_scale(crate::core::MAX_TIME_SCALE)
            .unwrap();

        let summary = engine.run();
        assert_eq!(summary.reason, StopReason::TickLimit);
        assert_eq!(summary.ticks, 3);
    }

    #[test]
    fn handle_reports_backlog() {
        let engine = EngineBuilder::new()
            .with_channel_capacity(1)
            .build(Countdown::new(0));
        let handle = engine.host_handle();

        handle.set_time_scale(1.0).unwrap();
        assert_eq!(handle.request_shutdown(), Err(HostError::Backlogged));
    }
}
