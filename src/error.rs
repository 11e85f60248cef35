use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the search pipeline. All of them are terminal for
/// the current session only and are reported to the host exactly once.
#[derive(Error, Debug)]
pub enum FastFindError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("search executable \"{0}\" not found")]
    ExecutableNotFound(String),

    #[error("failed to launch \"{executable}\": {source}")]
    Spawn {
        executable: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse search output: {0}")]
    Parse(String),

    #[error("failed to load search history from {}: {}", path.display(), reason)]
    HistoryLoad { path: PathBuf, reason: String },

    #[error("result index {index} out of range for {len} results")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to serialize search history: {0}")]
    HistorySerialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FastFindError>;
