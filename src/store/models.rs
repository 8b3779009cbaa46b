// Signet — Key data models
//
// The store treats key material as an opaque serializable payload. The only
// field it interprets is the key identifier (`kid`), surfaced through the
// `KeyMaterial` trait; everything else round-trips through serialization
// untouched.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// An opaque key payload the store can persist.
///
/// The store serializes the whole value to its storage form and never looks
/// inside it, except for the identifier used to address records.
pub trait KeyMaterial: Serialize + DeserializeOwned {
    /// The key identifier callers use to reference this key.
    fn kid(&self) -> &str;
}

/// A JWK-shaped payload with an identifier and arbitrary remaining members.
///
/// Suitable for callers that hold JWK documents whose exact shape varies by
/// algorithm: `kid` is pulled out for addressing, every other member is
/// captured verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyJwk {
    pub kid: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl KeyMaterial for AnyJwk {
    fn kid(&self) -> &str {
        &self.kid
    }
}

/// The retrieval-time view of a persisted key.
///
/// `created_at` is assigned by the storage layer at insertion time, never by
/// the caller, and is always UTC.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredKey<K> {
    pub key: K,
    pub created_at: DateTime<Utc>,
}

/// The result of listing every persisted key. Unordered: callers needing
/// determinism must sort on their side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyListing<K> {
    pub items: Vec<StoredKey<K>>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_any_jwk_preserves_unknown_members() {
        let doc = json!({
            "kid": "key-2024-001",
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "n": "modulus",
            "e": "AQAB",
        });

        let jwk: AnyJwk = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(jwk.kid(), "key-2024-001");
        assert_eq!(jwk.params.get("alg"), Some(&json!("RS256")));

        // Serializing back must reproduce the original document
        let round_tripped = serde_json::to_value(&jwk).unwrap();
        assert_eq!(round_tripped, doc);
    }

    #[test]
    fn test_any_jwk_with_no_extra_members() {
        let jwk: AnyJwk = serde_json::from_str(r#"{"kid":"bare"}"#).unwrap();
        assert_eq!(jwk.kid(), "bare");
        assert!(jwk.params.is_empty());
    }

    #[test]
    fn test_stored_key_serializes_created_at_as_utc() {
        let stored = StoredKey {
            key: AnyJwk {
                kid: "k1".to_string(),
                params: serde_json::Map::new(),
            },
            created_at: "2024-03-12T08:30:00Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["created_at"], json!("2024-03-12T08:30:00Z"));
    }
}
