// Signet — Library root
//
// A durable store for token-signing keys. The store persists opaque key
// payloads, lists them back for verification, and removes keys that have
// been rotated out. Rotation policy itself lives with the caller.

pub mod store;

pub use store::{
    AnyJwk, Database, KeyListing, KeyMaterial, KeyStore, SqliteKeyStore, StoreConfig, StoreError,
    StoredKey,
};
