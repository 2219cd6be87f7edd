//! Connection configuration.
//!
//! # Responsibility
//! - Describe how connections are opened and which pragmas they carry.
//! - Deserialize from any serde format supplied by the host application.
//!
//! # Invariants
//! - `path = None` means an in-memory database.
//! - Missing keys fall back to `DbConfig::default()`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Settings applied to every connection a provider opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Database file; `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// Enables `PRAGMA foreign_keys` on each connection.
    pub foreign_keys: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            foreign_keys: true,
        }
    }
}

impl DbConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub(crate) fn mode(&self) -> &'static str {
        if self.path.is_some() {
            "file"
        } else {
            "memory"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DbConfig;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn file_config_keeps_defaults_for_pragmas() {
        let config = DbConfig::file("/tmp/widgets.db");
        assert_eq!(config.path, Some(PathBuf::from("/tmp/widgets.db")));
        assert!(config.foreign_keys);
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.mode(), "file");
    }

    #[test]
    fn default_config_is_in_memory() {
        assert_eq!(DbConfig::in_memory().mode(), "memory");
    }
}
