//! Per-level typing statistics and the campaign score.
//!
//! All timing takes an explicit `now` (time since the game clock's origin)
//! so the engine can be driven by a real or a manual clock.

use std::time::Duration;

use crate::constants::CHARS_PER_WORD;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreEngine {
    pub correct_chars: u32,
    pub total_chars: u32,
    pub combo: u32,
    pub max_combo: u32,
    typing_started_at: Option<Duration>,
    eyes_closed: Duration,
    eyes_closed_since: Option<Duration>,
    pub level_score: u64,
    pub total_score: u64,
}

/// Snapshot of the numbers that feed a level's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub wpm: u32,
    pub accuracy: u32,
    pub max_combo: u32,
    pub eyes_closed_secs: f64,
    pub level_score: u64,
    pub total_score: u64,
}

/// `(wpm*10 + accuracy*5 + max_combo*2 + floor(eyes_closed*50)) * level`
pub fn level_score(
    wpm: u32,
    accuracy: u32,
    max_combo: u32,
    eyes_closed_secs: f64,
    level_number: u32,
) -> u64 {
    let eyes_bonus = (eyes_closed_secs.max(0.0) * 50.0).floor() as u64;
    let base =
        wpm as u64 * 10 + accuracy as u64 * 5 + max_combo as u64 * 2 + eyes_bonus;
    base * level_number as u64
}

impl ScoreEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_correct_char(&mut self) {
        self.correct_chars += 1;
        self.total_chars += 1;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }

    pub fn add_incorrect_char(&mut self) {
        self.total_chars += 1;
        self.combo = 0;
    }

    /// Anchor the WPM clock. Only the first call per level counts.
    pub fn start_typing(&mut self, now: Duration) {
        if self.typing_started_at.is_none() {
            self.typing_started_at = Some(now);
        }
    }

    pub fn typing_started(&self) -> bool {
        self.typing_started_at.is_some()
    }

    pub fn start_eyes_closed(&mut self, now: Duration) {
        if self.eyes_closed_since.is_none() {
            self.eyes_closed_since = Some(now);
        }
    }

    pub fn stop_eyes_closed(&mut self, now: Duration) {
        if let Some(since) = self.eyes_closed_since.take() {
            self.eyes_closed += now.saturating_sub(since);
        }
    }

    pub fn eyes_closed_open(&self) -> bool {
        self.eyes_closed_since.is_some()
    }

    /// Closed-eye time including any interval still open at `now`.
    pub fn eyes_closed_time(&self, now: Duration) -> Duration {
        match self.eyes_closed_since {
            Some(since) => self.eyes_closed + now.saturating_sub(since),
            None => self.eyes_closed,
        }
    }

    pub fn wpm(&self, now: Duration) -> u32 {
        let Some(start) = self.typing_started_at else {
            return 0;
        };
        let minutes = now.saturating_sub(start).as_secs_f64() / 60.0;
        if minutes <= 0.0 {
            return 0;
        }
        let words = self.correct_chars as f64 / CHARS_PER_WORD;
        (words / minutes).floor() as u32
    }

    pub fn accuracy(&self) -> u32 {
        if self.total_chars == 0 {
            return 100;
        }
        (self.correct_chars as u64 * 100 / self.total_chars as u64) as u32
    }

    pub fn calculate_level_score(&mut self, level_number: u32, now: Duration) -> u64 {
        self.level_score = level_score(
            self.wpm(now),
            self.accuracy(),
            self.max_combo,
            self.eyes_closed_time(now).as_secs_f64(),
            level_number,
        );
        self.level_score
    }

    /// Score the level and fold it into the total. Returns the delta.
    pub fn complete_level(&mut self, level_number: u32, now: Duration) -> u64 {
        self.stop_eyes_closed(now);
        let score = self.calculate_level_score(level_number, now);
        self.total_score += score;
        score
    }

    pub fn breakdown(&self, now: Duration) -> ScoreBreakdown {
        ScoreBreakdown {
            wpm: self.wpm(now),
            accuracy: self.accuracy(),
            max_combo: self.max_combo,
            eyes_closed_secs: self.eyes_closed_time(now).as_secs_f64(),
            level_score: self.level_score,
            total_score: self.total_score,
        }
    }

    pub fn reset_level(&mut self) {
        *self = Self {
            total_score: self.total_score,
            ..Self::default()
        };
    }

    pub fn reset_game(&mut self) {
        *self = Self::default();
    }
}
