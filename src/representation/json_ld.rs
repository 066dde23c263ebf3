//! JSON-LD (`application/ld+json`) with the Hydra vocabulary for collections.
//! Built with the vocabulary URL the `@context` should point at. Render-only.

use serde_json::{Value, json};

use super::{Capability, Representation};
use crate::JsonObject;
use crate::errors::ApiError;
use crate::models::PageInfo;
use crate::pagination::pagination_links;

const HYDRA_CONTEXT: &str = "http://www.w3.org/ns/hydra/context.jsonld";

pub struct JsonLd {
    vocab: String,
}

impl JsonLd {
    #[must_use]
    pub fn new(vocab: impl Into<String>) -> Self {
        Self {
            vocab: vocab.into(),
        }
    }

    fn entity(&self, id: &str, resource_type: &str, resource: &JsonObject) -> JsonObject {
        let mut entity = JsonObject::new();
        entity.insert("@id".to_string(), Value::String(id.to_string()));
        entity.insert("@type".to_string(), Value::String(resource_type.to_string()));
        for (key, value) in resource {
            entity.insert(key.clone(), value.clone());
        }
        entity
    }
}

impl Representation for JsonLd {
    fn content_type(&self) -> &'static str {
        "application/ld+json"
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::RenderOne | Capability::RenderPage)
    }

    fn render_one(
        &self,
        id: &str,
        resource_type: &str,
        _self_url: &str,
        resource: &JsonObject,
    ) -> Result<JsonObject, ApiError> {
        let mut body = JsonObject::new();
        body.insert("@context".to_string(), json!({ "@vocab": self.vocab }));
        for (key, value) in self.entity(id, resource_type, resource) {
            body.insert(key, value);
        }
        Ok(body)
    }

    fn render_page(
        &self,
        resource_type: &str,
        self_url: &str,
        total_count: u64,
        page: PageInfo,
        resources: &[(String, JsonObject)],
    ) -> Result<JsonObject, ApiError> {
        let links = pagination_links(total_count, page, self_url)?;

        let members: Vec<Value> = resources
            .iter()
            .map(|(id, resource)| Value::Object(self.entity(id, resource_type, resource)))
            .collect();

        let mut view = JsonObject::new();
        view.insert("@id".to_string(), Value::String(links.self_link));
        view.insert(
            "@type".to_string(),
            Value::String("hydra:PartialCollectionView".to_string()),
        );
        view.insert("hydra:first".to_string(), Value::String(links.first.clone()));
        if let Some(previous) = links.previous {
            view.insert("hydra:previous".to_string(), Value::String(previous));
        }
        if let Some(next) = links.next {
            view.insert("hydra:next".to_string(), Value::String(next));
        }
        view.insert("hydra:last".to_string(), Value::String(links.last));

        let mut body = JsonObject::new();
        body.insert(
            "@context".to_string(),
            json!({ "hydra": HYDRA_CONTEXT, "@vocab": self.vocab }),
        );
        body.insert("@id".to_string(), Value::String(links.first));
        body.insert(
            "@type".to_string(),
            Value::String("hydra:Collection".to_string()),
        );
        body.insert("hydra:totalItems".to_string(), Value::from(total_count));
        body.insert("hydra:member".to_string(), Value::Array(members));
        body.insert("hydra:view".to_string(), Value::Object(view));
        Ok(body)
    }
}
