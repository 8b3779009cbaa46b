// Signet — Store error types

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Schema bootstrap failed: {0}")]
    Initialization(#[source] rusqlite::Error),

    #[error("Write to the key table failed: {0}")]
    Write(#[source] rusqlite::Error),

    #[error("Read from the key table failed: {0}")]
    Read(#[source] rusqlite::Error),

    #[error("Key payload for '{kid}' could not be encoded or decoded")]
    Corruption {
        kid: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Operation exceeded the configured busy timeout: {0}")]
    Timeout(#[source] rusqlite::Error),
}

impl StoreError {
    /// Classify a failure during schema bootstrap.
    pub(crate) fn init(err: rusqlite::Error) -> Self {
        if is_busy(&err) {
            StoreError::Timeout(err)
        } else {
            StoreError::Initialization(err)
        }
    }

    /// Classify a failure during an insert or delete.
    pub(crate) fn write(err: rusqlite::Error) -> Self {
        if is_busy(&err) {
            StoreError::Timeout(err)
        } else {
            StoreError::Write(err)
        }
    }

    /// Classify a failure during a query.
    pub(crate) fn read(err: rusqlite::Error) -> Self {
        if is_busy(&err) {
            StoreError::Timeout(err)
        } else {
            StoreError::Read(err)
        }
    }

    pub(crate) fn corruption(
        kid: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Corruption {
            kid: kid.into(),
            source: Box::new(source),
        }
    }
}

/// SQLITE_BUSY and SQLITE_LOCKED mean the busy handler gave up waiting,
/// i.e. the configured deadline elapsed.
fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────
