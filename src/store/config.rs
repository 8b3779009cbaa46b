// Signet — Store configuration
//
// Carries only what is needed to reach the backing database: the file
// location and how long an operation may wait on a locked database before
// it fails with a timeout.

use std::path::PathBuf;
use std::time::Duration;

/// Default wait on a locked database before an operation gives up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for opening a signing-key store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the SQLite database file. Created on first open.
    pub path: PathBuf,
    /// Deadline for operations blocked on a concurrent writer. When it
    /// elapses the operation fails with `StoreError::Timeout`.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
