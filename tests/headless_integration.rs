use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::TestBackend, Terminal};

use nomires::app::App;
use nomires::assets::Sprite;
use nomires::audio::Silent;
use nomires::config::Config;
use nomires::game::{Game, GameState};
use nomires::highscores::MemoryHighScoreStore;
use nomires::levels::LevelProgression;
use nomires::perception::{Frame, Point, ScriptedSource, LEFT_EYE, RIGHT_EYE};
use nomires::phrases::{PhrasePool, Tier};
use nomires::runtime::{
    Clock, FixedTicker, GameEvent, ManualClock, Runner, TestEventSource,
};
use nomires::ui::TerminalRenderer;

const TICK: Duration = Duration::from_millis(16);

// Headless harness: real runtime, app and renderer, with a scripted clock,
// scripted eye frames and an in-memory terminal.
struct Harness {
    tx: Sender<GameEvent>,
    runner: Runner<TestEventSource, FixedTicker>,
    clock: ManualClock,
    app: App,
    source: ScriptedSource,
    renderer: TerminalRenderer<TestBackend>,
}

impl Harness {
    fn new(phrase: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(2)),
        );
        let sets: HashMap<Tier, Vec<String>> = Tier::ALL
            .iter()
            .map(|&t| (t, vec![phrase.to_string()]))
            .collect();
        let game = Game::new(
            LevelProgression::default(),
            PhrasePool::with_phrases(sets, StdRng::seed_from_u64(7)),
        );
        let app = App::new(
            &Config::default(),
            game,
            Box::new(MemoryHighScoreStore::default()),
            Box::new(Silent),
            Sprite::placeholder(),
        );
        let terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        Self {
            tx,
            runner,
            clock: ManualClock::new(),
            app,
            source: ScriptedSource::default(),
            renderer: TerminalRenderer::new(terminal),
        }
    }

    fn key(&self, code: KeyCode) {
        self.tx
            .send(GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }

    fn type_str(&self, s: &str) {
        for c in s.chars() {
            self.key(KeyCode::Char(c));
        }
    }

    /// One frame: drain queued input, advance the clock by a tick, run.
    fn frame(&mut self) -> bool {
        let events = self.runner.drain_tick();
        self.clock.advance(TICK);
        self.app
            .run_frame(
                &events,
                &mut self.source,
                &mut self.renderer,
                self.clock.now(),
                TICK,
            )
            .unwrap()
    }

    fn frames_until(&mut self, state: GameState, limit: usize) {
        for _ in 0..limit {
            if self.app.game.state() == state {
                return;
            }
            self.frame();
        }
        assert_eq!(self.app.game.state(), state);
    }

    fn screen(&mut self) -> String {
        self.renderer
            .terminal_mut()
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }
}

fn face(ratio: f64) -> Frame {
    let mut points = vec![Point::new(0.0, 0.0); 478];
    for (eye, x0) in [(LEFT_EYE, 100.0), (RIGHT_EYE, 300.0)] {
        let width = 40.0;
        let half = ratio * width / 2.0;
        points[eye[0]] = Point::new(x0, 50.0);
        points[eye[3]] = Point::new(x0 + width, 50.0);
        points[eye[1]] = Point::new(x0 + 13.0, 50.0 - half);
        points[eye[2]] = Point::new(x0 + 27.0, 50.0 - half);
        points[eye[4]] = Point::new(x0 + 27.0, 50.0 + half);
        points[eye[5]] = Point::new(x0 + 13.0, 50.0 + half);
    }
    Frame::with_face(points)
}

#[test]
fn headless_level_flow_completes() {
    let mut h = Harness::new("Hola mundo");
    h.frame();
    assert!(h.screen().contains("NO MIRES"));

    h.key(KeyCode::Enter);
    h.frame();
    assert_eq!(h.app.game.state(), GameState::Memorizing);
    assert!(h.screen().contains("Hola mundo"));

    // memorize window for level 1 is five seconds
    h.frames_until(GameState::Playing, 400);

    h.type_str("Hola mundo");
    h.frame();
    assert_eq!(h.app.game.state(), GameState::LevelComplete);
    assert!(h.screen().contains("Level 1 complete"));
    assert_eq!(h.app.game.score().accuracy(), 100);
    assert!(h.app.game.score().total_score > 0);

    h.key(KeyCode::Enter);
    h.frame();
    assert_eq!(h.app.game.state(), GameState::Memorizing);
    assert!(h.screen().contains("Level 2/5"));
}

#[test]
fn headless_closed_eyes_slow_walls() {
    let mut h = Harness::new("abc");
    h.key(KeyCode::Enter);
    h.frames_until(GameState::Playing, 400);

    h.source.push(Some(face(0.3)));
    h.frame();
    let open_step = h.app.game.walls().left.x;

    h.source.push(Some(face(0.05)));
    h.frame();
    let closed_step = h.app.game.walls().left.x - open_step;
    assert!(closed_step < open_step);
    assert!((closed_step - 0.25).abs() < 1e-9);

    // a frame with no face keeps the last reading
    h.source.push(Some(Frame::no_face()));
    h.frame();
    assert!(!h.app.tracker.eyes_open());
    assert!(h.screen().contains("eyes closed"));
}

#[test]
fn headless_crash_then_restart() {
    let mut h = Harness::new("abc");
    h.key(KeyCode::Enter);
    h.frames_until(GameState::Playing, 400);
    h.frames_until(GameState::GameOver, 2000);
    assert!(h.screen().contains("CRUSHED"));
    // nothing was typed, so nothing is recorded
    assert!(h.app.high_scores.is_empty());

    h.key(KeyCode::Enter);
    h.frame();
    assert_eq!(h.app.game.state(), GameState::Memorizing);
    assert_eq!(h.app.game.level().map(|l| l.number), Some(1));
    assert_eq!(h.app.game.walls().left.x, 0.0);
}

#[test]
fn headless_full_campaign_records_high_score() {
    let mut h = Harness::new("ok");
    h.key(KeyCode::Enter);
    h.frame();

    for level in 1..=5u32 {
        assert_eq!(h.app.game.level().map(|l| l.number), Some(level));
        h.frames_until(GameState::Playing, 400);
        h.type_str("ok");
        h.frame();
        assert_eq!(h.app.game.state(), GameState::LevelComplete);
        h.key(KeyCode::Enter);
        h.frame();
    }

    assert_eq!(h.app.game.state(), GameState::GameComplete);
    assert!(h.screen().contains("All levels cleared!"));
    assert_eq!(h.app.high_scores.len(), 1);
    assert_eq!(h.app.high_scores[0].score, h.app.game.score().total_score);
}

#[test]
fn headless_escape_quits_from_play() {
    let mut h = Harness::new("abc");
    h.key(KeyCode::Enter);
    h.frames_until(GameState::Playing, 400);
    h.key(KeyCode::Esc);
    assert!(!h.frame());
    assert!(h.app.should_quit());
}
