//! # CRUD service flows
//!
//! [`CrudService`] ties the crate together: it validates and translates
//! filters, clamps pagination, negotiates a representation, talks to the
//! [`DocumentStore`] and renders the result. It is framework-agnostic; the
//! embedding HTTP layer passes in the request URL, the `Accept` /
//! `Content-Type` tokens and the decoded body, and writes the returned
//! [`Rendered`] value out.

use serde_json::Value;
use tracing::debug;

use crate::JsonObject;
use crate::convert::EntityConverter;
use crate::errors::ApiError;
use crate::filtering::{FilterValidator, InvalidFilterPolicy, Operator, parse_comma_list};
use crate::models::{ListParams, PageBounds};
use crate::pagination::RelativeUrl;
use crate::representation::{Capability, RepresentationRegistry};
use crate::store::{DocumentStore, FindOptions, document_id};

/// Per-controller configuration of a [`CrudService`].
pub struct ServiceConfig {
    /// Resource type name used in envelopes and error messages, e.g. "cats".
    pub resource_type: String,
    /// Dot-path field names clients may filter, sort and project on.
    pub allowed_fields: Vec<String>,
    /// Operators clients may use in filter trees.
    pub allowed_operators: Vec<Operator>,
    /// Page-size default and ceiling.
    pub page_bounds: PageBounds,
    /// What to do with invalid filter entries.
    pub invalid_filter_policy: InvalidFilterPolicy,
    /// Keep disallowed logical operators as literal (escaped) field names
    /// instead of applying the policy.
    pub escape_invalid_logical: bool,
    /// The representations this controller serves, in preference order.
    pub registry: RepresentationRegistry,
}

impl ServiceConfig {
    /// A configuration with the default registry, page bounds and policy, the
    /// full operator vocabulary, and the given filterable fields.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, allowed_fields: Vec<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            allowed_fields,
            allowed_operators: Operator::all(),
            page_bounds: PageBounds::default(),
            invalid_filter_policy: InvalidFilterPolicy::default(),
            escape_invalid_logical: false,
            registry: RepresentationRegistry::default(),
        }
    }
}

/// A rendered response body plus the content type it was negotiated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content_type: String,
    pub body: JsonObject,
}

/// The generic CRUD flows for one collection.
pub struct CrudService<S, C> {
    store: S,
    converter: C,
    config: ServiceConfig,
}

impl<S: DocumentStore, C: EntityConverter> CrudService<S, C> {
    #[must_use]
    pub fn new(store: S, converter: C, config: ServiceConfig) -> Self {
        Self {
            store,
            converter,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// List one page of the collection.
    ///
    /// Filters are validated against the allow-lists, translated, and passed
    /// to the store with the clamped page window. The page is rendered keyed
    /// by document id, in result order.
    ///
    /// # Errors
    ///
    /// Validation errors from the filter tree, configuration errors from
    /// negotiation, and normalized store faults.
    pub async fn list(
        &self,
        params: &ListParams,
        request_url: &str,
        accept: Option<&str>,
    ) -> Result<Rendered, ApiError> {
        let representation = self.config.registry.negotiate(Capability::RenderPage, accept)?;

        let validated = FilterValidator::new(
            &self.config.allowed_operators,
            &self.config.allowed_fields,
            self.config.invalid_filter_policy,
        )
        .escape_invalid_logical(self.config.escape_invalid_logical)
        .validate(params.filters.as_ref())?;

        let query = self.converter.from_searchable(validated.as_ref());
        let fields = params.fields.as_deref().map(parse_comma_list);
        let projection = self.converter.from_dto_fields(fields.as_deref());
        let sort = params.sort.as_deref().map(parse_comma_list);
        let page = self
            .config
            .page_bounds
            .clamp(params.page_size, params.page_number);

        debug!(
            resource = %self.config.resource_type,
            page_size = page.size,
            page_number = page.current,
            "listing collection"
        );

        // The page number is only bounded below, so the window arithmetic must
        // saturate on extreme client input.
        let options = FindOptions {
            limit: Some(page.size),
            skip: Some(page.current.saturating_sub(1).saturating_mul(page.size)),
            sort: self.converter.from_dto_sort(sort.as_deref()),
        };
        let result = self.store.find(&query, projection.as_deref(), options).await?;
        let total_count = self.store.count(&query).await?;

        let resources: Vec<(String, JsonObject)> = result
            .iter()
            .map(|document| (document_id(document), self.converter.to_dto(document)))
            .collect();

        let body = representation.render_page(
            &self.config.resource_type,
            request_url,
            total_count,
            page,
            &resources,
        )?;
        Ok(Rendered {
            content_type: representation.content_type().to_string(),
            body,
        })
    }

    /// Fetch and render one document by id.
    ///
    /// # Errors
    ///
    /// 404 when the id matches nothing; configuration errors from negotiation.
    pub async fn get_one(
        &self,
        id: &str,
        fields: Option<&str>,
        request_url: &str,
        accept: Option<&str>,
    ) -> Result<Rendered, ApiError> {
        let representation = self.config.registry.negotiate(Capability::RenderOne, accept)?;
        let parsed_fields = fields.map(parse_comma_list);
        let projection = self.converter.from_dto_fields(parsed_fields.as_deref());

        let document = self
            .find_by_id(id, projection.as_deref())
            .await?
            .ok_or_else(|| ApiError::not_found(&self.config.resource_type, id))?;

        let body = representation.render_one(
            id,
            &self.config.resource_type,
            request_url,
            &self.converter.to_dto(&document),
        )?;
        Ok(Rendered {
            content_type: representation.content_type().to_string(),
            body,
        })
    }

    /// Create a document from a request body.
    ///
    /// The body parser is negotiated on the request's `Content-Type`, the
    /// renderer on its `Accept`. The created document is rendered at the
    /// request path extended by its id, query parameters dropped.
    ///
    /// # Errors
    ///
    /// Body envelope violations (400), negotiation failures (500), and
    /// normalized store faults (duplicate key → 409).
    pub async fn create(
        &self,
        body: &Value,
        request_url: &str,
        content_type: Option<&str>,
        accept: Option<&str>,
    ) -> Result<Rendered, ApiError> {
        let parser = self
            .config
            .registry
            .negotiate(Capability::ParseCreate, content_type)?;
        let creator = parser.parse_create_body(body, &self.config.resource_type)?;
        let renderer = self.config.registry.negotiate(Capability::RenderOne, accept)?;

        let stored = self.store.insert(self.converter.from_creator(creator)).await?;
        let id = document_id(&stored);

        let mut url = RelativeUrl::parse(request_url)?;
        url.retain_params(&[]).append_path_segment(&id);

        let rendered = renderer.render_one(
            &id,
            &self.config.resource_type,
            &url.to_string(),
            &self.converter.to_dto(&stored),
        )?;
        Ok(Rendered {
            content_type: renderer.content_type().to_string(),
            body: rendered,
        })
    }

    /// Update the document with the given id from a request body.
    ///
    /// Returns `None` when there is nothing to render: the change modified
    /// nothing, or the caller asked for no content. Otherwise the document is
    /// refetched and rendered at the request URL with only the `fields` query
    /// parameter retained.
    ///
    /// # Errors
    ///
    /// 404 when the id matches nothing; body envelope violations (400,
    /// including an id mismatch between body and path); store faults.
    pub async fn update(
        &self,
        id: &str,
        body: &Value,
        fields: Option<&str>,
        no_content: bool,
        request_url: &str,
        content_type: Option<&str>,
        accept: Option<&str>,
    ) -> Result<Option<Rendered>, ApiError> {
        let parser = self
            .config
            .registry
            .negotiate(Capability::ParseUpdate, content_type)?;
        let updater = parser.parse_update_body(body, &self.config.resource_type, id)?;
        let renderer = self.config.registry.negotiate(Capability::RenderOne, accept)?;

        let changes = self.converter.from_updater(id, updater);
        let outcome = self.store.update_by_id(id, changes).await?;
        if outcome.matched == 0 {
            return Err(ApiError::not_found_for(
                &self.config.resource_type,
                id,
                "update",
            ));
        }
        if outcome.modified == 0 || no_content {
            return Ok(None);
        }

        let parsed_fields = fields.map(parse_comma_list);
        let projection = self.converter.from_dto_fields(parsed_fields.as_deref());
        let document = self
            .find_by_id(id, projection.as_deref())
            .await?
            .ok_or_else(|| ApiError::not_found(&self.config.resource_type, id))?;

        let mut url = RelativeUrl::parse(request_url)?;
        url.retain_params(&["fields"]);

        let rendered = renderer.render_one(
            id,
            &self.config.resource_type,
            &url.to_string(),
            &self.converter.to_dto(&document),
        )?;
        Ok(Some(Rendered {
            content_type: renderer.content_type().to_string(),
            body: rendered,
        }))
    }

    /// Delete the document with the given id.
    ///
    /// # Errors
    ///
    /// 404 when nothing was deleted; normalized store faults.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let deleted = self.store.delete_by_id(id).await?;
        if deleted == 0 {
            return Err(ApiError::not_found_for(
                &self.config.resource_type,
                id,
                "delete",
            ));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &str,
        projection: Option<&[String]>,
    ) -> Result<Option<JsonObject>, ApiError> {
        let mut query = JsonObject::new();
        query.insert("_id".to_string(), Value::String(id.to_string()));
        let options = FindOptions {
            limit: Some(1),
            ..FindOptions::default()
        };
        let mut result = self.store.find(&query, projection, options).await?;
        Ok(if result.is_empty() {
            None
        } else {
            Some(result.remove(0))
        })
    }
}
