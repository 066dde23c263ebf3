//! # Entity conversion
//!
//! An [`EntityConverter`] maps between the entity shape stored in the
//! collection and the DTO shapes exposed over the API: response DTO, creation
//! body, update body, and the searchable surface of the filter grammar.
//!
//! Converters are shared across requests and must stay stateless. When the
//! stored entity and the DTO are the same shape, [`OneToOneConverter`] does
//! the job.

use serde_json::Value;

use crate::JsonObject;
use crate::filtering::{to_store_query, to_store_sort};

/// Mapping between the stored entity shape and the API-facing DTO shapes.
pub trait EntityConverter: Send + Sync {
    /// The response DTO for a stored entity document.
    fn to_dto(&self, entity: &JsonObject) -> JsonObject;

    /// The store query for a validated filter tree. `None` means no filter
    /// (match everything).
    fn from_searchable(&self, filters: Option<&JsonObject>) -> JsonObject;

    /// The entity-side projection for DTO field names. `None` means no
    /// projection (all fields).
    fn from_dto_fields(&self, fields: Option<&[String]>) -> Option<Vec<String>>;

    /// The store sort document for DTO sort names (`-` prefix = descending).
    fn from_dto_sort(&self, sort: Option<&[String]>) -> Option<JsonObject>;

    /// The entity document to insert for a creation body.
    fn from_creator(&self, creator: JsonObject) -> JsonObject;

    /// The change document for an update body targeting `id`.
    fn from_updater(&self, id: &str, updater: JsonObject) -> JsonObject;
}

/// Identity converter for entities exposed as-is: DTO, creator and updater all
/// share the entity shape, filters and sorts translate one-to-one.
pub struct OneToOneConverter;

impl EntityConverter for OneToOneConverter {
    fn to_dto(&self, entity: &JsonObject) -> JsonObject {
        entity.clone()
    }

    fn from_searchable(&self, filters: Option<&JsonObject>) -> JsonObject {
        to_store_query(filters)
    }

    fn from_dto_fields(&self, fields: Option<&[String]>) -> Option<Vec<String>> {
        fields.map(<[String]>::to_vec)
    }

    fn from_dto_sort(&self, sort: Option<&[String]>) -> Option<JsonObject> {
        sort.map(to_store_sort)
    }

    fn from_creator(&self, creator: JsonObject) -> JsonObject {
        creator
    }

    fn from_updater(&self, id: &str, updater: JsonObject) -> JsonObject {
        let mut changes = updater;
        changes.insert("_id".to_string(), Value::String(id.to_string()));
        changes
    }
}
