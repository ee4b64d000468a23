use std::io;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info};

use crate::assets::Sprite;
use crate::audio::AudioSink;
use crate::config::Config;
use crate::effects::{ParticleSystem, ScreenShake};
use crate::game::{Effect, Game, GameState, RunSummary};
use crate::highscores::{HighScoreStore, ScoreRecord};
use crate::input::map_key;
use crate::perception::{EyeTracker, PerceptionSource};
use crate::runtime::GameEvent;
use crate::ui::{RenderSink, Scene};

/// The game plus everything around it: perception, feedback effects and
/// high score persistence. One `run_frame` call is one fixed tick.
pub struct App {
    pub game: Game,
    pub tracker: EyeTracker,
    pub particles: ParticleSystem,
    pub shake: ScreenShake,
    pub high_scores: Vec<ScoreRecord>,
    player_name: String,
    sound: bool,
    sprite: Sprite,
    store: Box<dyn HighScoreStore>,
    audio: Box<dyn AudioSink>,
    shake_offset: f64,
    quit: bool,
}

impl App {
    pub fn new(
        config: &Config,
        game: Game,
        store: Box<dyn HighScoreStore>,
        audio: Box<dyn AudioSink>,
        sprite: Sprite,
    ) -> Self {
        let high_scores = store.load();
        Self {
            game,
            tracker: EyeTracker::new(config.ear_threshold),
            particles: ParticleSystem::new(),
            shake: ScreenShake::default(),
            high_scores,
            player_name: config.player_name.clone(),
            sound: config.sound,
            sprite,
            store,
            audio,
            shake_offset: 0.0,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Route one terminal event to the game.
    pub fn handle_event(&mut self, event: &GameEvent, now: Duration) {
        let GameEvent::Key(key) = event else {
            return;
        };
        let typing = self.game.state() == GameState::Playing;
        if let Some(input) = map_key(*key, typing) {
            let effects = self.game.handle_input(input, now);
            self.apply(effects);
        }
    }

    /// Input, then perception, then the simulation step, then feedback.
    /// `dt` drives particle motion.
    pub fn update(
        &mut self,
        events: &[GameEvent],
        source: &mut dyn PerceptionSource,
        now: Duration,
        dt: Duration,
    ) {
        for event in events {
            self.handle_event(event, now);
            if self.quit {
                return;
            }
        }

        let eyes_open = self.tracker.sample(source);
        let effects = self.game.tick(now, eyes_open);
        self.apply(effects);

        self.particles.update(dt.as_secs_f64());
        self.shake_offset = self.shake.next_offset();
    }

    /// `update` followed by a draw. Returns false once the player has quit.
    pub fn run_frame<R: RenderSink>(
        &mut self,
        events: &[GameEvent],
        source: &mut dyn PerceptionSource,
        renderer: &mut R,
        now: Duration,
        dt: Duration,
    ) -> io::Result<bool> {
        self.update(events, source, now, dt);
        if self.quit {
            return Ok(false);
        }
        renderer.draw(&self.scene(now))?;
        Ok(true)
    }

    pub fn scene(&self, now: Duration) -> Scene<'_> {
        Scene {
            game: self.game.view(now),
            particles: &self.particles.particles,
            shake: self.shake_offset,
            high_scores: &self.high_scores,
            sprite: &self.sprite,
            player_name: &self.player_name,
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Sound(cue) => {
                    if self.sound {
                        self.audio.play(cue);
                    }
                }
                Effect::Burst { x, y, kind, count } => self.particles.emit(x, y, kind, count),
                Effect::Shake => self.shake.start(),
                Effect::RunEnded(summary) => self.record_run(summary),
                Effect::Quit => {
                    info!("quit requested");
                    self.quit = true;
                }
            }
        }
    }

    fn record_run(&mut self, summary: RunSummary) {
        info!(
            score = summary.total_score,
            levels = summary.levels_cleared,
            completed = summary.completed,
            "run ended"
        );
        if summary.total_score == 0 {
            debug!("empty run, not recorded");
            return;
        }
        let record = ScoreRecord {
            name: self.player_name.clone(),
            score: summary.total_score,
            wpm: summary.wpm,
            accuracy: summary.accuracy,
            max_combo: summary.max_combo,
            achieved_at: Some(Local::now()),
        };
        self.high_scores = self.store.submit(record);
    }
}
