//! # docrud
//!
//! The reusable core of generic CRUD REST controllers over a document store:
//!
//! - A structured filter grammar (`?filters[age][$gte]=2`) with a recursive
//!   validator ([`filtering::FilterValidator`]) that sanitizes trees against
//!   per-controller allow-lists.
//! - Translation of the wire operators into store query documents with
//!   byte-stable clause merging ([`filtering::to_store_query`]).
//! - Pagination-link computation with deterministic, sorted query-parameter
//!   serialization ([`pagination::pagination_links`]).
//! - A [`representation::Representation`] contract with content negotiation
//!   and four reference formats: plain JSON, HAL, JSON:API and JSON-LD/Hydra.
//! - A framework-agnostic [`service::CrudService`] running the list / get /
//!   create / update / delete flows against an abstract
//!   [`store::DocumentStore`].
//!
//! The crate never routes HTTP or talks to a database; the embedding
//! application provides the web framework glue and a store implementation.
//!
//! ```rust,ignore
//! let service = CrudService::new(
//!     store,
//!     OneToOneConverter,
//!     ServiceConfig::new("cats", vec!["name".into(), "age".into()]),
//! );
//! let page = service.list(&params, "/cats?page[size]=10", None).await?;
//! ```

pub mod convert;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod pagination;
pub mod representation;
pub mod service;
pub mod store;

/// A JSON object map. Key insertion order is preserved and is part of the
/// crate's output contracts.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

pub use convert::{EntityConverter, OneToOneConverter};
pub use errors::ApiError;
pub use filtering::{FilterValidator, InvalidFilterPolicy, Operator};
pub use models::{ListParams, PageBounds, PageInfo};
pub use pagination::{PaginationLinks, RelativeUrl, pagination_links};
pub use representation::{Capability, Representation, RepresentationRegistry};
pub use service::{CrudService, Rendered, ServiceConfig};
pub use store::{DocumentStore, FindOptions, StoreError, UpdateOutcome};
