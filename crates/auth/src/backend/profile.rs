//! Profile store abstraction.
//!
//! A schemaless document store: named collections of JSON-object
//! documents keyed by string IDs. Reads of absent documents return
//! `Ok(None)`; errors are reserved for refusals and failures, and each
//! carries a stable machine-readable code the diagnostics surface
//! verbatim.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Collection names used by this application.
pub mod collections {
    /// User account documents, keyed by UID.
    pub const USERS: &str = "users";

    /// Product listings, keyed by product ID.
    pub const PRODUCTS: &str = "products";

    /// Customer orders.
    pub const ORDERS: &str = "orders";

    /// Pharmacy operator profiles, keyed by the owner's UID.
    pub const PHARMACIES: &str = "pharmacies";

    /// Application-wide settings documents.
    pub const SETTINGS: &str = "settings";

    /// Saved delivery addresses.
    pub const ADDRESSES: &str = "addresses";
}

/// The fields of a stored document: a JSON object.
pub type Document = serde_json::Map<String, Value>;

/// A document together with its ID, as returned from queries.
#[derive(Debug, Clone, PartialEq)]
pub struct DocEntry {
    /// Document ID within its collection.
    pub id: String,
    /// The document's fields.
    pub fields: Document,
}

/// How [`ProfileStore::set`] treats fields absent from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace the whole document with the payload.
    #[default]
    Overwrite,
    /// Update only the payload's top-level fields, preserving the rest.
    Merge,
}

/// Errors reported by a profile store.
///
/// A missing document is not an error; reads return `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The operation was rejected by the store's security rules.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// The store's own description of the refusal.
        message: String,
    },

    /// The store could not be reached or failed internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A document's fields did not decode into the expected shape.
    #[error("corrupted document: {0}")]
    Corrupted(String),
}

impl StoreError {
    /// Stable machine-readable error code, in the store's own
    /// vocabulary. Diagnostics report this verbatim.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "permission-denied",
            Self::Unavailable(_) => "unavailable",
            Self::Corrupted(_) => "data-loss",
        }
    }

    /// The bare error message, without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::PermissionDenied { message } => message,
            Self::Unavailable(message) | Self::Corrupted(message) => message,
        }
    }
}

/// Schemaless document storage.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a document by ID. Absent documents are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PermissionDenied`] if the read is refused,
    /// [`StoreError::Unavailable`] if the store fails.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Write a document, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PermissionDenied`] if the write is refused,
    /// [`StoreError::Unavailable`] if the store fails.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError>;

    /// All documents in `collection` whose `field` equals `value`, in
    /// stable ID order, up to `limit` when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PermissionDenied`] if the query is refused,
    /// [`StoreError::Unavailable`] if the store fails.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<DocEntry>, StoreError>;
}

/// Decode a document's fields into a typed model.
///
/// # Errors
///
/// Returns [`StoreError::Corrupted`] when the fields do not match the
/// target shape.
pub fn decode<T: DeserializeOwned>(fields: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| StoreError::Corrupted(e.to_string()))
}

/// Encode a typed model into document fields.
///
/// # Errors
///
/// Returns [`StoreError::Corrupted`] when the value does not serialize
/// to a JSON object.
pub fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(StoreError::Corrupted(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(StoreError::Corrupted(e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn encode_then_decode_preserves_fields() {
        let sample = Sample {
            name: "Biogesic".to_owned(),
            count: 3,
        };
        let fields = encode(&sample).unwrap();
        assert_eq!(fields.get("name"), Some(&json!("Biogesic")));
        let back: Sample = decode(fields).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn decode_rejects_wrong_types() {
        let mut fields = Document::new();
        fields.insert("name".to_owned(), json!("ok"));
        fields.insert("count".to_owned(), json!("not a number"));

        let err = decode::<Sample>(fields).unwrap_err();
        assert_eq!(err.code(), "data-loss");
    }

    #[test]
    fn encode_rejects_non_objects() {
        let err = encode(&42).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }

    #[test]
    fn error_codes_are_stable() {
        let denied = StoreError::PermissionDenied {
            message: "Missing or insufficient permissions.".to_owned(),
        };
        assert_eq!(denied.code(), "permission-denied");
        assert_eq!(denied.message(), "Missing or insufficient permissions.");
        assert_eq!(StoreError::Unavailable(String::new()).code(), "unavailable");
    }
}
