// Signet — Key Store Repository
//
// The three operations of the store: add one key, list every key, remove a
// batch of keys by identifier. Each operation is a single round trip to the
// database; interleaving guarantees come from SQLite's own transactional
// isolation, the store adds no locking of its own.

use std::marker::PhantomData;

use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter};

use super::config::StoreConfig;
use super::db::Database;
use super::models::{KeyListing, KeyMaterial, StoredKey};
use super::StoreError;

/// Storage form of `created_at`, as written by the column default.
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over signing-key persistence.
///
/// Implementations are stateless façades over a transactional table: no
/// caching, no retries, no rotation policy. Records are immutable — there
/// is no update operation.
pub trait KeyStore<K: KeyMaterial> {
    /// Persist a key. A new record is always inserted; a pre-existing
    /// record with the same `kid` is neither checked for nor replaced.
    fn add_key(&self, key: &K) -> Result<(), StoreError>;

    /// Retrieve every persisted key, in no particular order.
    fn list_keys(&self) -> Result<KeyListing<K>, StoreError>;

    /// Delete every record whose `kid` is in the given batch. Idempotent:
    /// absent kids are skipped silently, and an empty batch is a no-op.
    fn remove_keys(&self, kids: &[&str]) -> Result<(), StoreError>;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

pub struct SqliteKeyStore<K> {
    db: Database,
    _payload: PhantomData<K>,
}

impl<K: KeyMaterial> SqliteKeyStore<K> {
    /// Open the database described by `config`, apply any pending schema
    /// migrations, and return a ready-to-use store. The only way to obtain
    /// a store is through a bootstrapped [`Database`], so an instance is
    /// never observable before its schema is current.
    pub fn create(config: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self::new(Database::open(config)?))
    }

    /// Wrap an already-bootstrapped database.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            _payload: PhantomData,
        }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Decode one raw row into its retrieval-time view. A payload or
    /// timestamp that does not decode fails the whole listing, naming the
    /// offending kid.
    fn decode_row(kid: &str, key_json: &str, created_at: &str) -> Result<StoredKey<K>, StoreError> {
        let key: K =
            serde_json::from_str(key_json).map_err(|e| StoreError::corruption(kid, e))?;

        let created_at = NaiveDateTime::parse_from_str(created_at, CREATED_AT_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| StoreError::corruption(kid, e))?;

        Ok(StoredKey { key, created_at })
    }
}

impl<K: KeyMaterial> KeyStore<K> for SqliteKeyStore<K> {
    fn add_key(&self, key: &K) -> Result<(), StoreError> {
        let kid = key.kid().to_owned();
        let payload =
            serde_json::to_string(key).map_err(|e| StoreError::corruption(&kid, e))?;

        // created_at comes from the column default, not from the caller
        self.db
            .conn()
            .execute(
                "INSERT INTO signing_keys (kid, key) VALUES (?1, ?2)",
                params![kid, payload],
            )
            .map_err(StoreError::write)?;

        tracing::info!(kid = %kid, "Signing key stored");

        Ok(())
    }

    fn list_keys(&self) -> Result<KeyListing<K>, StoreError> {
        let mut stmt = self
            .db
            .conn()
            .prepare("SELECT kid, key, created_at FROM signing_keys")
            .map_err(StoreError::read)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(StoreError::read)?;

        let mut items = Vec::new();
        for row in rows {
            let (kid, key_json, created_at) = row.map_err(StoreError::read)?;
            items.push(Self::decode_row(&kid, &key_json, &created_at)?);
        }

        Ok(KeyListing { items })
    }

    fn remove_keys(&self, kids: &[&str]) -> Result<(), StoreError> {
        if kids.is_empty() {
            return Ok(());
        }

        let placeholders = (1..=kids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let removed = self
            .db
            .conn()
            .execute(
                &format!("DELETE FROM signing_keys WHERE kid IN ({placeholders})"),
                params_from_iter(kids.iter()),
            )
            .map_err(StoreError::write)?;

        tracing::info!(kids = ?kids, removed, "Signing keys removed");

        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
