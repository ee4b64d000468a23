use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::constants::{DEFAULT_EAR_THRESHOLD, DEFAULT_TICK_RATE_HZ};
use crate::error::{NomiresError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub player_name: String,
    /// Eye aspect ratio above which eyes count as open.
    pub ear_threshold: f64,
    pub tick_rate_hz: u32,
    /// External landmark detector, program followed by its arguments.
    pub detector_command: Option<Vec<String>>,
    pub detector_read_timeout_ms: u64,
    pub sound: bool,
    pub sprite_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            detector_command: None,
            detector_read_timeout_ms: 5,
            sound: true,
            sprite_path: None,
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        let hz = self.tick_rate_hz.clamp(1, 1000);
        Duration::from_secs_f64(1.0 / hz as f64)
    }

    pub fn detector_read_timeout(&self) -> Duration {
        Duration::from_millis(self.detector_read_timeout_ms)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("nomires_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict read of the config file.
    pub fn read(&self) -> Result<Config> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match self.read() {
            Ok(cfg) => cfg,
            Err(NomiresError::Io(e)) if e.kind() == ErrorKind::NotFound => Config::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            player_name: "Ana".into(),
            ear_threshold: 0.25,
            tick_rate_hz: 30,
            detector_command: Some(vec!["python3".into(), "mesh.py".into()]),
            detector_read_timeout_ms: 10,
            sound: false,
            sprite_path: Some(PathBuf::from("/tmp/cat.txt")),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
        assert_matches!(store.read(), Err(NomiresError::Io(_)));
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
        assert_matches!(store.read(), Err(NomiresError::Json(_)));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"player_name": "Luz", "sound": false}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.player_name, "Luz");
        assert!(!cfg.sound);
        assert_eq!(cfg.tick_rate_hz, 60);
        assert_eq!(cfg.ear_threshold, 0.2);
    }

    #[test]
    fn tick_interval_from_rate() {
        let cfg = Config::default();
        assert_eq!(cfg.tick_interval(), Duration::from_secs_f64(1.0 / 60.0));
        let cfg = Config {
            tick_rate_hz: 0,
            ..Config::default()
        };
        assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
    }
}
