use std::io;
use std::path::PathBuf;

/// Errors surfaced by the library. Gameplay outcomes (a crash into a wall,
/// running out of levels) are states, not errors.
#[derive(Debug, thiserror::Error)]
pub enum NomiresError {
    #[error("failed to start eye detector `{command}`: {source}")]
    PerceptionInit {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("eye detector command is empty")]
    EmptyDetectorCommand,

    #[error("failed to load asset {path}: {reason}")]
    Asset { path: PathBuf, reason: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, NomiresError>;
