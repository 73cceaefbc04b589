//=========================================================================
// Lobby Flow Demo
//=========================================================================
//
// Lobby → Match → Results, driven by the fixed-rate engine.
//
// - The lobby waits for a matchmaking thread to report an opponent, then
//   counts down and fades into the match.
// - The match scores points over time into a shared `Session`.
// - The results screen lingers briefly and hands over to no mode, which
//   ends the run.
//
// Run with:
//   cargo run --example lobby_flow
//   RUST_LOG=debug cargo run --example lobby_flow
//
//=========================================================================

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use aetheric_modes::prelude::*;
use crossbeam_channel::{bounded, Receiver};
use tracing_subscriber::EnvFilter;

//=== Session =============================================================

/// Process-wide player state, passed explicitly into every mode.
#[derive(Debug, Default)]
struct Session {
    nickname: String,
    opponent: Option<String>,
    my_score: u32,
    enemy_score: u32,
}

type SharedSession = Arc<Mutex<Session>>;

//=== Console Overlay =====================================================

struct ConsoleOverlay {
    label: &'static str,
    last_quarter: i32,
}

impl ConsoleOverlay {
    fn new(label: &'static str) -> Self {
        println!("[{}] overlay created", label);
        Self {
            label,
            last_quarter: -1,
        }
    }
}

impl FadeSurface for ConsoleOverlay {
    fn set_alpha(&mut self, alpha: f32) {
        let quarter = (alpha * 4.0).round() as i32;
        if quarter != self.last_quarter {
            self.last_quarter = quarter;
            println!("[{}] alpha {:.2}", self.label, alpha);
        }
    }
}

impl Drop for ConsoleOverlay {
    fn drop(&mut self) {
        println!("[{}] overlay released", self.label);
    }
}

//=== Lobby ===============================================================

const COUNTDOWN: Duration = Duration::from_secs(3);

struct LobbyMode {
    signal: HandoverSignal,
    session: SharedSession,
    matchmaking: Option<Receiver<String>>,
    countdown_from: Option<Duration>,
    announced: u64,
}

impl LobbyMode {
    fn new(session: SharedSession) -> Self {
        Self {
            signal: HandoverSignal::new(),
            session,
            matchmaking: None,
            countdown_from: None,
            announced: u64::MAX,
        }
    }
}

impl Mode for LobbyMode {
    fn handover_signal(&mut self) -> &mut HandoverSignal {
        &mut self.signal
    }

    fn begin_enter(&mut self) {
        let nickname = self.session.lock().unwrap().nickname.clone();
        println!("Lobby: {} is searching for a room", nickname);

        let (found, matchmaking) = bounded(1);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(400));
            let _ = found.send("Player_4242".to_string());
        });
        self.matchmaking = Some(matchmaking);
    }

    fn run_body(&mut self, time: &FrameTime) -> Step {
        if self.countdown_from.is_none() {
            let opponent = self.matchmaking.as_ref().and_then(|rx| rx.try_recv().ok());
            if let Some(opponent) = opponent {
                println!("Lobby: {} joined the room", opponent);
                self.session.lock().unwrap().opponent = Some(opponent);
                self.countdown_from = Some(time.elapsed);
            }
            return Step::Yield;
        }

        let started = self.countdown_from.unwrap_or(time.elapsed);
        let waited = time.elapsed.saturating_sub(started);
        if waited < COUNTDOWN {
            let left = (COUNTDOWN - waited).as_secs() + 1;
            if left != self.announced {
                self.announced = left;
                println!("Lobby: match starts in {}", left);
            }
            return Step::Yield;
        }

        let next = MatchMode::new(Arc::clone(&self.session));
        let fade = ScreenFade::new(Duration::from_millis(500), ConsoleOverlay::new("lobby→match"));
        if let Err(err) = self.signal.emit(HandoverRequest::to(next, fade)) {
            eprintln!("Lobby: handover rejected: {}", err);
        }
        Step::Done
    }

    fn end_exit(&mut self) {
        self.matchmaking = None;
        println!("Lobby: closed");
    }
}

//=== Match ===============================================================

const WINNING_SCORE: u32 = 3;
const POINT_EVERY: Duration = Duration::from_millis(300);

struct MatchMode {
    signal: HandoverSignal,
    session: SharedSession,
    next_point_at: Option<Duration>,
    points_played: u32,
}

impl MatchMode {
    fn new(session: SharedSession) -> Self {
        Self {
            signal: HandoverSignal::new(),
            session,
            next_point_at: None,
            points_played: 0,
        }
    }
}

impl Mode for MatchMode {
    fn handover_signal(&mut self) -> &mut HandoverSignal {
        &mut self.signal
    }

    fn begin_enter(&mut self) {
        let mut session = self.session.lock().unwrap();
        session.my_score = 0;
        session.enemy_score = 0;
        println!("Match: loading arena");
    }

    fn end_enter(&mut self) {
        println!("Match: fight!");
    }

    fn run_body(&mut self, time: &FrameTime) -> Step {
        let due = *self.next_point_at.get_or_insert(time.elapsed + POINT_EVERY);
        if time.elapsed < due {
            return Step::Yield;
        }
        self.next_point_at = Some(due + POINT_EVERY);
        self.points_played += 1;

        let finished = {
            let mut session = self.session.lock().unwrap();
            if self.points_played % 3 == 0 {
                session.enemy_score += 1;
            } else {
                session.my_score += 1;
            }
            println!("Match: {} - {}", session.my_score, session.enemy_score);
            session.my_score.max(session.enemy_score) >= WINNING_SCORE
        };

        if finished {
            let next = ResultsMode::new(Arc::clone(&self.session));
            let fade = ScreenFade::new(Duration::from_millis(400), ConsoleOverlay::new("match→results"));
            if let Err(err) = self.signal.emit(HandoverRequest::to(next, fade)) {
                eprintln!("Match: handover rejected: {}", err);
            }
        }
        Step::Yield
    }

    fn end_exit(&mut self) {
        println!("Match: arena unloaded");
    }
}

//=== Results =============================================================

const RESULTS_LINGER: Duration = Duration::from_secs(1);

struct ResultsMode {
    signal: HandoverSignal,
    session: SharedSession,
    shown_at: Option<Duration>,
}

impl ResultsMode {
    fn new(session: SharedSession) -> Self {
        Self {
            signal: HandoverSignal::new(),
            session,
            shown_at: None,
        }
    }
}

impl Mode for ResultsMode {
    fn handover_signal(&mut self) -> &mut HandoverSignal {
        &mut self.signal
    }

    fn end_enter(&mut self) {
        let session = self.session.lock().unwrap();
        let verdict = if session.my_score > session.enemy_score {
            "Victory"
        } else {
            "Defeat"
        };
        println!(
            "Results: {} ({} vs {}: {} - {})",
            verdict,
            session.nickname,
            session.opponent.as_deref().unwrap_or("?"),
            session.my_score,
            session.enemy_score
        );
    }

    fn run_body(&mut self, time: &FrameTime) -> Step {
        let shown_at = *self.shown_at.get_or_insert(time.elapsed);
        if time.elapsed.saturating_sub(shown_at) < RESULTS_LINGER {
            return Step::Yield;
        }

        if let Err(err) = self.signal.emit(HandoverRequest::shutdown(CutTransition)) {
            eprintln!("Results: shutdown rejected: {}", err);
        }
        Step::Done
    }
}

//=== Main ================================================================

fn main() {
    // Library `log` records are forwarded to the subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let session = Arc::new(Mutex::new(Session {
        nickname: "Player_1337".to_string(),
        ..Session::default()
    }));

    let summary = EngineBuilder::new()
        .with_tps(60.0)
        .build(LobbyMode::new(session))
        .run();

    println!(
        "Finished in {} ticks with {} handovers ({:?}, last mode {})",
        summary.ticks, summary.handovers, summary.reason, summary.final_mode
    );
}
