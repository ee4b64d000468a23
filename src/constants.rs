//! Playfield geometry and gameplay tuning.
//!
//! Distances are in playfield units. The playfield is a virtual 1280x720
//! surface; the terminal renderer scales it to whatever area it gets.

use std::time::Duration;

pub const PLAYFIELD_WIDTH: f64 = 1280.0;
pub const PLAYFIELD_HEIGHT: f64 = 720.0;

pub const FLOOR_HEIGHT: f64 = 16.0;
pub const GROUND_Y: f64 = PLAYFIELD_HEIGHT - FLOOR_HEIGHT;

pub const PLAYER_SIZE: f64 = 80.0;
pub const PLAYER_START_X: f64 = PLAYFIELD_WIDTH / 2.0 - PLAYER_SIZE / 2.0;
pub const PLAYER_START_Y: f64 = GROUND_Y - PLAYER_SIZE;

pub const WALL_WIDTH: f64 = 30.0;
pub const WALL_HEIGHT: f64 = 450.0;
pub const WALL_START_LEFT: f64 = 0.0;
pub const WALL_START_RIGHT: f64 = PLAYFIELD_WIDTH - WALL_WIDTH;

/// Distance at which danger starts rising above zero.
pub const SAFE_DISTANCE: f64 = PLAYFIELD_WIDTH / 4.0;

/// Wall speed while the player's eyes are reported closed.
pub const CREEP_SPEED: f64 = 0.25;

/// Added to the run's wall-speed baseline on every wrong keystroke.
pub const ERROR_SPEED_PENALTY: f64 = 0.3;

/// How long walls hold still after a phrase is completed.
pub const WALL_FREEZE: Duration = Duration::from_secs(2);

pub const DEFAULT_EAR_THRESHOLD: f64 = 0.2;
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

pub const HIGH_SCORE_LIMIT: usize = 10;

/// Characters per "word" when computing words per minute.
pub const CHARS_PER_WORD: f64 = 5.0;
