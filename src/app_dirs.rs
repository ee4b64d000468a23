use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("nomires"),
            )
        } else {
            ProjectDirs::from("", "", "nomires").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "nomires").map(|pd| pd.config_dir().join("config.json"))
    }

    pub fn high_scores_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("high_scores.json"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("nomires.log"))
    }
}
