//! Logging configuration
//!
//! Consumed by the binary's subscriber setup. The log file name carries a
//! timestamp fixed once per process, so every call to
//! [`LogConfig::current_log_path`] within a session agrees.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

static SESSION_STAMP: OnceLock<String> = OnceLock::new();

fn session_stamp() -> &'static str {
    SESSION_STAMP.get_or_init(|| chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string())
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level: trace, debug, info, warn or error
    pub level: String,
    /// Write to stderr
    pub console_output: bool,
    /// Write to a file under `log_dir`
    pub file_output: bool,
    /// Directory for log files
    pub log_dir: PathBuf,
    /// File name prefix
    pub file_prefix: String,
    /// Number of log files to keep, 0 keeps all
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
            file_prefix: "lumencue".to_string(),
            max_files: 10,
        }
    }
}

impl LogConfig {
    /// Level filter for `level`, falling back to INFO when unrecognized
    pub fn parse_level(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create the log directory if file output is enabled
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }

    /// Path of this session's log file
    pub fn current_log_path(&self) -> PathBuf {
        self.log_dir
            .join(format!("{}_{}.log", self.file_prefix, session_stamp()))
    }

    /// Delete the oldest log files beyond `max_files`
    ///
    /// Returns the number of files removed. The file about to be written by
    /// this session counts towards the limit.
    pub fn cleanup_old_logs(&self) -> io::Result<usize> {
        if self.max_files == 0 || !self.log_dir.is_dir() {
            return Ok(0);
        }

        let prefix = format!("{}_", self.file_prefix);
        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension().is_some_and(|ext| ext == "log")
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();

        // Timestamps sort lexically
        logs.sort();

        let keep = self.max_files.saturating_sub(1);
        let excess = logs.len().saturating_sub(keep);
        let mut removed = 0;
        for path in logs.into_iter().take(excess) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("Failed to remove old log {:?}: {}", path, e),
            }
        }
        Ok(removed)
    }
}
