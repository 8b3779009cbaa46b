// Signet — Database Management
//
// Opens the SQLite database and brings its schema to the latest version.
// Migrations are an ordered list of named, idempotent SQL steps; applied
// names are recorded in a bookkeeping table so repeated opens only apply
// the delta. Concurrent first-time bootstrap is serialized by running the
// whole delta inside one transaction.

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::{params, Connection};

use super::config::StoreConfig;
use super::StoreError;

/// Bookkeeping table owned by the migration mechanism.
const MIGRATION_TABLE: &str = "signet_migrations";

/// Ordered schema migrations, oldest first. Entries are append-only; a
/// released migration is never edited in place.
///
/// `created_at` defaults to UTC wall-clock in `%Y-%m-%d %H:%M:%S` form,
/// assigned by SQLite at insert time. Listing parses the same format back
/// as UTC. There is deliberately no uniqueness constraint on `kid`.
const MIGRATIONS: &[(&str, &str)] = &[(
    "20240312_create_signing_keys",
    "CREATE TABLE IF NOT EXISTS signing_keys (
        kid         TEXT NOT NULL,
        key         TEXT NOT NULL,
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S', 'now'))
    )",
)];

/// Wrapper around the SQLite connection. A `Database` is only obtainable
/// through [`Database::open`], which has already applied all pending
/// migrations, so holding one means the schema is current.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database described by `config` and bring its
    /// schema up to date. Safe to call on every process start.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(&config.path).map_err(StoreError::init)?;
        conn.busy_timeout(config.busy_timeout)
            .map_err(StoreError::init)?;

        let db = Self { conn };
        db.apply_migrations()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing only).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::init)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Apply every migration not yet recorded in the bookkeeping table.
    /// A no-op when the schema is already current.
    fn apply_migrations(&self) -> Result<(), StoreError> {
        self.conn
            .execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {MIGRATION_TABLE} (
                        name        TEXT PRIMARY KEY,
                        applied_at  TEXT NOT NULL
                    )"
                ),
                [],
            )
            .map_err(StoreError::init)?;

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(StoreError::init)?;

        let applied: HashSet<String> = {
            let mut stmt = tx
                .prepare(&format!("SELECT name FROM {MIGRATION_TABLE}"))
                .map_err(StoreError::init)?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(StoreError::init)?;
            let mut names = HashSet::new();
            for row in rows {
                names.insert(row.map_err(StoreError::init)?);
            }
            names
        };

        for (name, sql) in MIGRATIONS {
            if applied.contains(*name) {
                continue;
            }

            tx.execute_batch(sql).map_err(StoreError::init)?;
            tx.execute(
                &format!("INSERT INTO {MIGRATION_TABLE} (name, applied_at) VALUES (?1, ?2)"),
                params![name, Utc::now().to_rfc3339()],
            )
            .map_err(StoreError::init)?;

            tracing::debug!(migration = %name, "Applied schema migration");
        }

        tx.commit().map_err(StoreError::init)?;

        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_succeeds() {
        let db = Database::open_in_memory();
        assert!(db.is_ok(), "Should be able to open an in-memory database");
    }

    #[test]
    fn test_bootstrap_creates_key_table() {
        let db = Database::open_in_memory().unwrap();

        let count: i64 = db
            .conn()
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='signing_keys'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "signing_keys table should exist");
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(
            db.apply_migrations().is_ok(),
            "Re-applying migrations should not error"
        );

        // Each migration must be recorded exactly once
        let count: i64 = db
            .conn()
            .query_row("SELECT count(*) FROM signet_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count as usize, MIGRATIONS.len());
    }

    #[test]
    fn test_reopening_existing_database_does_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("keys.db"));

        {
            let _db = Database::open(&config).unwrap();
        }

        let db = Database::open(&config);
        assert!(db.is_ok(), "Second open over the same file must succeed");
    }

    #[test]
    fn test_created_at_defaults_to_utc_wall_clock() {
        let db = Database::open_in_memory().unwrap();

        db.conn()
            .execute(
                "INSERT INTO signing_keys (kid, key) VALUES ('k1', '{}')",
                [],
            )
            .unwrap();

        let stored: String = db
            .conn()
            .query_row("SELECT created_at FROM signing_keys", [], |row| row.get(0))
            .unwrap();

        let parsed = chrono::NaiveDateTime::parse_from_str(&stored, "%Y-%m-%d %H:%M:%S")
            .expect("created_at should be in %Y-%m-%d %H:%M:%S form")
            .and_utc();
        let delta = (Utc::now() - parsed).num_seconds().abs();
        assert!(delta <= 5, "created_at should be current UTC time");
    }

    #[test]
    fn test_kid_is_not_unique() {
        let db = Database::open_in_memory().unwrap();

        for _ in 0..2 {
            db.conn()
                .execute(
                    "INSERT INTO signing_keys (kid, key) VALUES ('dup', '{}')",
                    [],
                )
                .unwrap();
        }

        let count: i64 = db
            .conn()
            .query_row(
                "SELECT count(*) FROM signing_keys WHERE kid = 'dup'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2, "Duplicate kids are permitted at the storage layer");
    }
}
