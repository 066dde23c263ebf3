//! # Representations and content negotiation
//!
//! A [`Representation`] turns DTO maps into a response body for one media type
//! and, when the format defines a request envelope, extracts the DTO back out
//! of a request body. Four reference implementations ship with the crate:
//!
//! | type | content type | renders | parses |
//! |---|---|---|---|
//! | [`SimpleJson`] | `application/json` | yes | yes |
//! | [`Hal`] | `application/hal+json` | yes | no |
//! | [`JsonApi`] | `application/vnd.api+json` | yes | yes |
//! | [`JsonLd`] | `application/ld+json` | yes | no |
//!
//! The [`RepresentationRegistry`] holds an ordered list of representations and
//! resolves the `Accept`/`Content-Type` token of a request to one of them. A
//! token the registry cannot satisfy is a server configuration problem (the
//! route advertised a format it cannot produce), not a client error.

mod hal;
mod json_api;
mod json_ld;
mod simple_json;

pub use hal::Hal;
pub use json_api::JsonApi;
pub use json_ld::JsonLd;
pub use simple_json::SimpleJson;

use serde_json::Value;

use crate::JsonObject;
use crate::errors::ApiError;
use crate::models::PageInfo;

/// One of the four optional abilities of a representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    RenderOne,
    RenderPage,
    ParseCreate,
    ParseUpdate,
}

/// A response/request format for one media type.
///
/// Every method is optional; the default bodies report the missing ability as
/// a configuration error. Implementations override [`supports`] to advertise
/// what they actually implement so the registry can negotiate by capability.
///
/// [`supports`]: Representation::supports
pub trait Representation: Send + Sync {
    /// The MIME type this representation produces and consumes.
    fn content_type(&self) -> &'static str;

    /// Whether this representation implements `capability`.
    fn supports(&self, capability: Capability) -> bool;

    /// Render a single document.
    ///
    /// `self_url` is the URL the document is reachable at (path + query).
    ///
    /// # Errors
    ///
    /// The default body reports a missing renderer (configuration error).
    fn render_one(
        &self,
        id: &str,
        resource_type: &str,
        self_url: &str,
        resource: &JsonObject,
    ) -> Result<JsonObject, ApiError> {
        let _ = (id, resource_type, self_url, resource);
        Err(no_renderer())
    }

    /// Render one page of a collection.
    ///
    /// `resources` pairs each document id with its DTO, in result order.
    ///
    /// # Errors
    ///
    /// The default body reports a missing renderer (configuration error).
    fn render_page(
        &self,
        resource_type: &str,
        self_url: &str,
        total_count: u64,
        page: PageInfo,
        resources: &[(String, JsonObject)],
    ) -> Result<JsonObject, ApiError> {
        let _ = (resource_type, self_url, total_count, page, resources);
        Err(no_renderer())
    }

    /// Extract the creation DTO from a request body.
    ///
    /// # Errors
    ///
    /// Envelope violations are validation errors (400); the default body
    /// reports a missing parser (configuration error).
    fn parse_create_body(
        &self,
        input: &Value,
        resource_type: &str,
    ) -> Result<JsonObject, ApiError> {
        let _ = (input, resource_type);
        Err(no_parser())
    }

    /// Extract the update DTO from a request body targeting document `id`.
    ///
    /// # Errors
    ///
    /// Envelope violations are validation errors (400); the default body
    /// reports a missing parser (configuration error).
    fn parse_update_body(
        &self,
        input: &Value,
        resource_type: &str,
        id: &str,
    ) -> Result<JsonObject, ApiError> {
        let _ = (input, resource_type, id);
        Err(no_parser())
    }
}

impl std::fmt::Debug for dyn Representation + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Representation")
            .field("content_type", &self.content_type())
            .finish()
    }
}

fn no_renderer() -> ApiError {
    ApiError::configuration("Unable to find a renderer to display the result")
}

fn no_parser() -> ApiError {
    ApiError::configuration("Unable to find a parser to read the request")
}

/// Ordered, immutable set of representations a controller serves.
pub struct RepresentationRegistry {
    entries: Vec<Box<dyn Representation>>,
}

impl RepresentationRegistry {
    #[must_use]
    pub fn new(entries: Vec<Box<dyn Representation>>) -> Self {
        Self { entries }
    }

    /// The content types able to fulfill `capability`, in registry order.
    #[must_use]
    pub fn content_types(&self, capability: Capability) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|representation| representation.supports(capability))
            .map(|representation| representation.content_type())
            .collect()
    }

    /// Resolve a request's content-type token to a representation able to
    /// fulfill `capability`.
    ///
    /// An absent token falls back to the first representation supporting the
    /// capability. A token naming no supporting representation is a
    /// configuration error: the route accepted a format it cannot serve.
    ///
    /// # Errors
    ///
    /// Configuration error (500) when no representation supports the
    /// capability, or when `requested` is not among the supporting types.
    pub fn negotiate(
        &self,
        capability: Capability,
        requested: Option<&str>,
    ) -> Result<&dyn Representation, ApiError> {
        let mut supporting = self
            .entries
            .iter()
            .filter(|representation| representation.supports(capability))
            .peekable();
        if supporting.peek().is_none() {
            return Err(ApiError::configuration("No output format provided"));
        }

        match requested {
            None => supporting
                .next()
                .map(|representation| &**representation)
                .ok_or_else(|| ApiError::configuration("No output format provided")),
            Some(token) => supporting
                .find(|representation| representation.content_type() == token)
                .map(|representation| &**representation)
                .ok_or_else(|| {
                    ApiError::configuration(format!(
                        "The provided Accept header (\"{token}\") is not in the list of possible response"
                    ))
                }),
        }
    }
}

impl Default for RepresentationRegistry {
    /// The out-of-the-box registry: JSON:API first, HAL second.
    fn default() -> Self {
        Self::new(vec![Box::new(JsonApi), Box::new(Hal)])
    }
}
