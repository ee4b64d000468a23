use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::constants::HIGH_SCORE_LIMIT;
use crate::error::{NomiresError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u64,
    pub wpm: u32,
    pub accuracy: u32,
    pub max_combo: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved_at: Option<DateTime<Local>>,
}

/// Best-first, at most ten entries. Ties keep insertion order.
pub fn insert_record(table: Vec<ScoreRecord>, record: ScoreRecord) -> Vec<ScoreRecord> {
    table
        .into_iter()
        .chain(std::iter::once(record))
        .sorted_by(|a, b| b.score.cmp(&a.score))
        .take(HIGH_SCORE_LIMIT)
        .collect()
}

pub trait HighScoreStore {
    /// Unreadable or missing tables load as empty.
    fn load(&self) -> Vec<ScoreRecord>;
    fn save(&self, table: &[ScoreRecord]) -> std::io::Result<()>;

    /// Add `record`, persist, and return the updated table. A failed write
    /// still returns the in-memory table.
    fn submit(&self, record: ScoreRecord) -> Vec<ScoreRecord> {
        let table = insert_record(self.load(), record);
        if let Err(e) = self.save(&table) {
            warn!(error = %e, "failed to save high scores");
        }
        table
    }
}

#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::high_scores_path().unwrap_or_else(|| PathBuf::from("high_scores.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// Strict read of the table file.
    pub fn read(&self) -> Result<Vec<ScoreRecord>> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> Vec<ScoreRecord> {
        match self.read() {
            Ok(table) => table,
            Err(NomiresError::Io(e)) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable high score table");
                Vec::new()
            }
        }
    }

    fn save(&self, table: &[ScoreRecord]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(table).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// Keeps the table in memory only.
#[derive(Debug, Default)]
pub struct MemoryHighScoreStore {
    table: std::cell::RefCell<Vec<ScoreRecord>>,
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> Vec<ScoreRecord> {
        self.table.borrow().clone()
    }

    fn save(&self, table: &[ScoreRecord]) -> std::io::Result<()> {
        *self.table.borrow_mut() = table.to_vec();
        Ok(())
    }
}
