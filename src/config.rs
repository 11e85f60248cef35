//! Typed search configuration loaded from a JSON settings file.
//!
//! Every recognized option is enumerated here with its default; the only
//! required key is `executable`. Loading fails fast with a message naming
//! the recognized options instead of surfacing a bare deserialization
//! error.

use crate::error::{FastFindError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Options recognized in the settings file, listed in load errors.
const RECOGNIZED_OPTIONS: &str = "executable, case_sensitive, file_type_pattern, \
     non_std_file_type_pattern, ignore_folders, before_context, after_context, \
     history_file, display_outline, kill_on_cancel, root";

/// Immutable per-session search configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfiguration {
    /// Name or path of the search executable (required).
    pub executable: String,
    /// When false the builder emits a case-insensitivity flag.
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    /// Standard file-type tags, selected with `-t<tag>`.
    #[serde(default)]
    pub file_type_pattern: Vec<String>,
    /// Custom file-type tags; each registers `<tag>:*.<tag>` before being
    /// selected.
    #[serde(default)]
    pub non_std_file_type_pattern: Vec<String>,
    /// Folder names excluded from the search via glob negation.
    #[serde(default)]
    pub ignore_folders: Vec<String>,
    #[serde(default = "default_context")]
    pub before_context: u32,
    #[serde(default = "default_context")]
    pub after_context: u32,
    /// History snapshot filename. None disables persistence entirely.
    #[serde(default)]
    pub history_file: Option<String>,
    /// Host hint: outline the selected match in the result view.
    #[serde(default = "default_true")]
    pub display_outline: bool,
    /// Kill the in-flight child process when the result picker is
    /// dismissed. Off by default: a dismissed search runs to completion
    /// and still updates the history.
    #[serde(default)]
    pub kill_on_cancel: bool,
    /// Working directory for the child process. Inherited when absent.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_context() -> u32 {
    1
}

impl Default for SearchConfiguration {
    fn default() -> Self {
        Self {
            executable: "rg".to_string(),
            case_sensitive: true,
            file_type_pattern: Vec::new(),
            non_std_file_type_pattern: Vec::new(),
            ignore_folders: Vec::new(),
            before_context: default_context(),
            after_context: default_context(),
            history_file: None,
            display_outline: true,
            kill_on_cancel: false,
            root: None,
        }
    }
}

impl SearchConfiguration {
    /// Load the configuration from a JSON settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            FastFindError::Configuration(format!(
                "cannot read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            FastFindError::Configuration(format!(
                "invalid settings file {}: {}\nrecognized options: {}",
                path.display(),
                e,
                RECOGNIZED_OPTIONS
            ))
        })
    }

    /// Resolve the configured executable against PATH.
    ///
    /// Used by hosts as a preflight check; the executor reports the same
    /// error when spawning fails with a not-found condition.
    pub fn resolve_executable(&self) -> Result<PathBuf> {
        which::which(&self.executable)
            .map_err(|_| FastFindError::ExecutableNotFound(self.executable.clone()))
    }
}
