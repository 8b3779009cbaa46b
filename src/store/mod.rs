// Signet — Store Module
//
// SQLite-backed persistence for signing keys: one table, three operations
// (add, list, remove), and an idempotent schema-bootstrap step. The key
// payload is opaque to the store; only its `kid` is interpreted.

mod config;
mod db;
mod error;
mod models;
mod repository;

pub use config::StoreConfig;
pub use db::Database;
pub use error::StoreError;
pub use models::{AnyJwk, KeyListing, KeyMaterial, StoredKey};
pub use repository::{KeyStore, SqliteKeyStore};
