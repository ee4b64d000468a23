//! The game state machine.
//!
//! `Game` owns every simulation subsystem and is advanced by two calls: one
//! per input event and one per tick. Both return the side effects (sounds,
//! particles, persistence) for the caller to carry out, so the whole
//! simulation runs without a terminal.

use std::time::Duration;
use tracing::{debug, info};

use crate::constants::{CREEP_SPEED, ERROR_SPEED_PENALTY, WALL_FREEZE};
use crate::effects::BurstKind;
use crate::levels::{Level, LevelProgression};
use crate::phrases::PhrasePool;
use crate::player::Player;
use crate::score::{ScoreBreakdown, ScoreEngine};
use crate::typing::{Outcome, Prompt};
use crate::walls::Walls;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum GameState {
    Menu,
    Memorizing,
    Playing,
    LevelComplete,
    GameOver,
    GameComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Confirm,
    Char(char),
    Backspace,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCategory {
    Letter,
    Space,
    Other,
}

impl KeyCategory {
    pub fn of(c: char) -> Self {
        if c == ' ' {
            KeyCategory::Space
        } else if c.is_alphanumeric() {
            KeyCategory::Letter
        } else {
            KeyCategory::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Miss,
    Keystroke(KeyCategory),
    PhraseComplete,
    Crash,
}

/// Final numbers of a run, handed out when the run ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub total_score: u64,
    pub wpm: u32,
    pub accuracy: u32,
    pub max_combo: u32,
    pub levels_cleared: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Sound(SoundCue),
    Burst {
        x: f64,
        y: f64,
        kind: BurstKind,
        count: usize,
    },
    Shake,
    RunEnded(RunSummary),
    Quit,
}

/// What an input means in a given state, before any simulation data is
/// consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartRun,
    FinishLevel,
    Type(char),
    Erase,
    Quit,
    Ignore,
}

pub fn route(state: GameState, input: InputEvent) -> Command {
    use GameState::*;
    match (state, input) {
        (_, InputEvent::Quit) => Command::Quit,
        (Menu | GameOver | GameComplete, InputEvent::Confirm) => Command::StartRun,
        (LevelComplete, InputEvent::Confirm) => Command::FinishLevel,
        (Playing, InputEvent::Char(c)) => Command::Type(c),
        (Playing, InputEvent::Backspace) => Command::Erase,
        _ => Command::Ignore,
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct GameView<'a> {
    pub state: GameState,
    pub walls: &'a Walls,
    pub player: &'a Player,
    pub prompt: &'a Prompt,
    pub level_number: u32,
    pub total_levels: usize,
    pub countdown: Duration,
    pub eyes_open: bool,
    pub frozen: bool,
    pub wall_speed: f64,
    pub score: ScoreBreakdown,
    pub last_level_score: u64,
}

#[derive(Debug)]
pub struct Game {
    state: GameState,
    levels: LevelProgression,
    phrases: PhrasePool,
    walls: Walls,
    player: Player,
    score: ScoreEngine,
    /// Added to every level's wall speed; grows with each wrong keystroke
    /// and only resets when a new run starts.
    speed_penalty: f64,
    level_started_at: Duration,
    freeze_remaining: Duration,
    last_tick: Option<Duration>,
    eyes_open: bool,
    last_level_score: u64,
    levels_cleared: u32,
    /// Numbers frozen at the moment a level ends, so result screens don't
    /// keep recomputing WPM against a running clock.
    final_breakdown: Option<ScoreBreakdown>,
}

impl Game {
    pub fn new(levels: LevelProgression, phrases: PhrasePool) -> Self {
        Self {
            state: GameState::Menu,
            levels,
            phrases,
            walls: Walls::new(),
            player: Player::new(),
            score: ScoreEngine::new(),
            speed_penalty: 0.0,
            level_started_at: Duration::ZERO,
            freeze_remaining: Duration::ZERO,
            last_tick: None,
            eyes_open: true,
            last_level_score: 0,
            levels_cleared: 0,
            final_breakdown: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn walls(&self) -> &Walls {
        &self.walls
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn score(&self) -> &ScoreEngine {
        &self.score
    }

    pub fn prompt(&self) -> &Prompt {
        self.phrases.prompt()
    }

    pub fn level(&self) -> Option<&Level> {
        self.levels.current()
    }

    pub fn speed_penalty(&self) -> f64 {
        self.speed_penalty
    }

    pub fn is_frozen(&self) -> bool {
        !self.freeze_remaining.is_zero()
    }

    /// Wall speed with open eyes: the level's baseline plus the run's
    /// accumulated error penalty.
    pub fn configured_speed(&self) -> f64 {
        self.levels.current().map_or(0.0, |l| l.wall_speed) + self.speed_penalty
    }

    fn set_state(&mut self, next: GameState) {
        if next != self.state {
            info!(from = %self.state, to = %next, level = self.levels.number(), "state change");
            self.state = next;
        }
    }

    pub fn handle_input(&mut self, input: InputEvent, now: Duration) -> Vec<Effect> {
        match route(self.state, input) {
            Command::Quit => vec![Effect::Quit],
            Command::StartRun => {
                self.start_run(now);
                Vec::new()
            }
            Command::FinishLevel => self.finish_level(now),
            Command::Type(c) => self.type_char(c, now),
            Command::Erase => {
                self.phrases.remove_last();
                Vec::new()
            }
            Command::Ignore => Vec::new(),
        }
    }

    fn start_run(&mut self, now: Duration) {
        self.levels.reset();
        self.score.reset_game();
        self.speed_penalty = 0.0;
        self.freeze_remaining = Duration::ZERO;
        self.levels_cleared = 0;
        self.last_level_score = 0;
        self.start_new_level(now);
    }

    /// Reset the playfield for the current level and show its phrase. The
    /// wall speed comes from the level config plus the carried penalty.
    pub fn start_new_level(&mut self, now: Duration) {
        let Some(level) = self.levels.current().cloned() else {
            self.set_state(GameState::GameComplete);
            return;
        };

        self.player.reset();
        self.walls.reset();
        self.score.reset_level();
        self.final_breakdown = None;
        self.walls.set_speed(level.wall_speed + self.speed_penalty);
        let phrase = self.phrases.select(level.phrase_difficulty);
        debug!(level = level.number, %phrase, "new phrase");
        self.level_started_at = now;
        self.set_state(GameState::Memorizing);
    }

    fn finish_level(&mut self, now: Duration) -> Vec<Effect> {
        if self.levels.advance() {
            self.start_new_level(now);
            Vec::new()
        } else {
            self.set_state(GameState::GameComplete);
            vec![Effect::RunEnded(self.summary(now, true))]
        }
    }

    fn type_char(&mut self, c: char, now: Duration) -> Vec<Effect> {
        let mut effects = Vec::new();
        let outcome = self.phrases.prompt_mut().write(c);
        let center = self.player.rect();
        let (cx, cy) = (center.x + center.w / 2.0, center.y + center.h / 2.0);

        match outcome {
            Outcome::Correct => {
                self.score.add_correct_char();
                effects.push(Effect::Sound(SoundCue::Keystroke(KeyCategory::of(c))));
            }
            Outcome::Incorrect => {
                self.score.add_incorrect_char();
                self.speed_penalty += ERROR_SPEED_PENALTY;
                debug!(penalty = self.speed_penalty, "wrong keystroke");
                effects.push(Effect::Sound(SoundCue::Miss));
                effects.push(Effect::Shake);
                effects.push(Effect::Burst {
                    x: cx,
                    y: cy,
                    kind: BurstKind::Spark,
                    count: 6,
                });
            }
        }

        if self.phrases.matches() {
            self.freeze_remaining = WALL_FREEZE;
            self.walls.disable();
            let level_number = self.levels.number();
            self.last_level_score = self.score.complete_level(level_number, now);
            self.levels_cleared += 1;
            self.final_breakdown = Some(self.score.breakdown(now));
            info!(
                level = level_number,
                score = self.last_level_score,
                total = self.score.total_score,
                "level complete"
            );
            self.set_state(GameState::LevelComplete);
            effects.push(Effect::Sound(SoundCue::PhraseComplete));
            effects.push(Effect::Burst {
                x: cx,
                y: cy,
                kind: BurstKind::Celebration,
                count: 40,
            });
        }

        effects
    }

    /// One fixed simulation step.
    pub fn tick(&mut self, now: Duration, eyes_open: bool) -> Vec<Effect> {
        let dt = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_tick = Some(now);
        self.eyes_open = eyes_open;

        match self.state {
            GameState::Memorizing => {
                if self.countdown(now).is_zero() {
                    self.score.start_typing(now);
                    self.set_state(GameState::Playing);
                }
                Vec::new()
            }
            GameState::Playing => self.tick_playing(now, dt, eyes_open),
            _ => Vec::new(),
        }
    }

    fn tick_playing(&mut self, now: Duration, dt: Duration, eyes_open: bool) -> Vec<Effect> {
        let mut effects = Vec::new();

        if eyes_open {
            self.score.stop_eyes_closed(now);
        } else {
            self.score.start_eyes_closed(now);
        }

        if self.is_frozen() {
            self.walls.disable();
            self.freeze_remaining = self.freeze_remaining.saturating_sub(dt);
        } else {
            let speed = if eyes_open {
                self.configured_speed()
            } else {
                CREEP_SPEED
            };
            self.walls.set_speed(speed);
            self.walls.enable();
        }

        if self.walls.tick() {
            let floor = self.player.rect().bottom();
            for x in [self.walls.left.inner_edge(), self.walls.right.inner_edge()] {
                effects.push(Effect::Burst {
                    x,
                    y: floor,
                    kind: BurstKind::Dust,
                    count: 1,
                });
            }
        }

        self.player.update_danger(&self.walls);
        if self.player.check_collision(&self.walls) {
            self.walls.disable();
            self.score.stop_eyes_closed(now);
            self.final_breakdown = Some(self.score.breakdown(now));
            info!(
                level = self.levels.number(),
                total = self.score.total_score,
                "crushed"
            );
            self.set_state(GameState::GameOver);
            effects.push(Effect::Sound(SoundCue::Crash));
            effects.push(Effect::Shake);
            effects.push(Effect::RunEnded(self.summary(now, false)));
        }

        effects
    }

    /// Memorization time left; zero outside of `Memorizing`.
    pub fn countdown(&self, now: Duration) -> Duration {
        if self.state != GameState::Memorizing {
            return Duration::ZERO;
        }
        let tolerance = self
            .levels
            .current()
            .map_or(Duration::ZERO, |l| l.tolerance_time);
        tolerance.saturating_sub(now.saturating_sub(self.level_started_at))
    }

    pub fn breakdown(&self, now: Duration) -> ScoreBreakdown {
        self.final_breakdown
            .unwrap_or_else(|| self.score.breakdown(now))
    }

    fn summary(&self, now: Duration, completed: bool) -> RunSummary {
        let numbers = self.breakdown(now);
        RunSummary {
            total_score: self.score.total_score,
            wpm: numbers.wpm,
            accuracy: numbers.accuracy,
            max_combo: numbers.max_combo,
            levels_cleared: self.levels_cleared,
            completed,
        }
    }

    pub fn view(&self, now: Duration) -> GameView<'_> {
        GameView {
            state: self.state,
            walls: &self.walls,
            player: &self.player,
            prompt: self.phrases.prompt(),
            level_number: self.levels.number(),
            total_levels: self.levels.total(),
            countdown: self.countdown(now),
            eyes_open: self.eyes_open,
            frozen: self.is_frozen(),
            wall_speed: self.walls.speed(),
            score: self.breakdown(now),
            last_level_score: self.last_level_score,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(LevelProgression::default(), PhrasePool::new())
    }
}
