// Library surface for the binary and for headless integration tests.
pub mod app;
pub mod app_dirs;
pub mod assets;
pub mod audio;
pub mod config;
pub mod constants;
pub mod effects;
pub mod error;
pub mod game;
pub mod highscores;
pub mod input;
pub mod levels;
pub mod logging;
pub mod perception;
pub mod phrases;
pub mod player;
pub mod runtime;
pub mod score;
pub mod typing;
pub mod ui;
pub mod walls;

pub use error::{NomiresError, Result};
