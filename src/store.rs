//! # Document store collaborator
//!
//! The crate never talks to a database itself; the embedding application
//! provides a [`DocumentStore`] for one collection. Documents cross the seam
//! as JSON maps keyed by `_id`, queries and sorts as the store-operator
//! documents produced by [`crate::filtering`].
//!
//! Driver faults come back as [`StoreError`] and are normalized into the
//! crate's error taxonomy by the `From` conversion below.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::JsonObject;
use crate::errors::ApiError;

/// Options of a [`DocumentStore::find`] call.
#[derive(Debug, Default, Clone)]
pub struct FindOptions {
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
    /// Number of matching documents to skip.
    pub skip: Option<u64>,
    /// Sort document (`field -> 1 | -1`), in significance order.
    pub sort: Option<JsonObject>,
}

/// Result of an update: how many documents the id matched and how many the
/// change actually modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Failure reported by the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. `keys` holds the
    /// conflicting field/value pairs when the driver reports them.
    #[error("duplicate key")]
    DuplicateKey { keys: JsonObject },

    /// The store rejected the document shape (schema or cast failure).
    #[error("{title}: {detail}")]
    InvalidDocument { title: String, detail: String },

    /// The store cannot be reached or failed unexpectedly.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateKey { keys } => {
                let reduced = if keys.is_empty() {
                    ": \"?\"".to_string()
                } else {
                    keys.iter()
                        .map(|(key, value)| format!("{key}: {value}"))
                        .collect::<Vec<_>>()
                        .join("), (")
                };
                Self::conflict(format!("A document with the keys ({reduced}) already exist"))
            }
            StoreError::InvalidDocument { title, detail } => Self::document_rejected(title, detail),
            StoreError::Unavailable(details) => {
                Self::internal("The document store is unavailable", Some(details))
            }
        }
    }
}

/// Asynchronous access to one document collection.
///
/// Implementations receive already-translated store queries; they never see
/// the wire-level filter grammar.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find documents matching `query`, optionally projected to `projection`
    /// plus the id field.
    async fn find(
        &self,
        query: &JsonObject,
        projection: Option<&[String]>,
        options: FindOptions,
    ) -> Result<Vec<JsonObject>, StoreError>;

    /// Count the documents matching `query`.
    async fn count(&self, query: &JsonObject) -> Result<u64, StoreError>;

    /// Insert one document and return it as stored (with its `_id`).
    async fn insert(&self, document: JsonObject) -> Result<JsonObject, StoreError>;

    /// Apply `changes` to the document with the given id.
    async fn update_by_id(
        &self,
        id: &str,
        changes: JsonObject,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Delete the document with the given id, returning the deleted count.
    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError>;
}

/// The id of a stored document, as a string.
#[must_use]
pub fn document_id(document: &JsonObject) -> String {
    match document.get("_id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_duplicate_key_maps_to_conflict() {
        let mut keys = JsonObject::new();
        keys.insert("name".to_string(), json!("felix"));
        keys.insert("color".to_string(), json!("black"));
        let err: ApiError = StoreError::DuplicateKey { keys }.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            err.detail(),
            "A document with the keys (name: \"felix\"), (color: \"black\") already exist"
        );
    }

    #[test]
    fn test_duplicate_key_without_diagnostics() {
        let err: ApiError = StoreError::DuplicateKey {
            keys: JsonObject::new(),
        }
        .into();
        assert_eq!(
            err.detail(),
            "A document with the keys (: \"?\") already exist"
        );
    }

    #[test]
    fn test_invalid_document_maps_to_400() {
        let err: ApiError = StoreError::InvalidDocument {
            title: "Cast Error".to_string(),
            detail: "cannot cast \"x\" to number".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.title(), "Cast Error");
    }

    #[test]
    fn test_unavailable_hides_details() {
        let err: ApiError = StoreError::Unavailable("connection refused".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.detail().contains("connection refused"));
    }

    #[test]
    fn test_document_id_forms() {
        let mut doc = JsonObject::new();
        doc.insert("_id".to_string(), json!("abc"));
        assert_eq!(document_id(&doc), "abc");
        doc.insert("_id".to_string(), json!(42));
        assert_eq!(document_id(&doc), "42");
        assert_eq!(document_id(&JsonObject::new()), "");
    }
}
