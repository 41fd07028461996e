//! File-based configuration for scorecard front ends.
//!
//! # Responsibility
//! - Load optional JSON settings (data paths, log level).
//! - Resolve every path against one data directory.
//!
//! # Invariants
//! - Loading never fails: a missing file yields defaults, a corrupt file
//!   yields defaults plus a warning log line.

use crate::logging::LogLevel;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".scorecard";
const DEFAULT_DB_FILE_NAME: &str = "scorecard.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "logs";
const DEFAULT_EXPORT_DIR_NAME: &str = "exports";

/// User settings. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorecardConfig {
    /// Root for every derived path below.
    pub data_dir: Option<PathBuf>,
    /// SQLite database file holding both persisted blobs.
    pub db_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: Option<String>,
    pub export_dir: Option<PathBuf>,
}

impl ScorecardConfig {
    /// Reads `path`, falling back to defaults when absent or unparsable.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                warn!(
                    "event=config_load module=config status=fallback path={} error={}",
                    path.display(),
                    err
                );
                return Self::default();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!(
                "event=config_load module=config status=fallback path={} error={}",
                path.display(),
                err
            );
            Self::default()
        })
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join(DEFAULT_DB_FILE_NAME))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join(DEFAULT_LOG_DIR_NAME))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join(DEFAULT_EXPORT_DIR_NAME))
    }

    /// Configured level, or the build default when unset or unsupported.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or_else(LogLevel::build_default)
    }
}
