//! HAL (`application/hal+json`): documents carry a `_links.self` object and
//! their fields inline; collections embed the page under `_embedded` with full
//! pagination links. Render-only, HAL defines no request envelope.

use serde_json::{Value, json};

use super::{Capability, Representation};
use crate::JsonObject;
use crate::errors::ApiError;
use crate::models::PageInfo;
use crate::pagination::pagination_links;

pub struct Hal;

fn href(url: &str) -> Value {
    json!({ "href": url })
}

impl Representation for Hal {
    fn content_type(&self) -> &'static str {
        "application/hal+json"
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::RenderOne | Capability::RenderPage)
    }

    fn render_one(
        &self,
        _id: &str,
        resource_type: &str,
        self_url: &str,
        resource: &JsonObject,
    ) -> Result<JsonObject, ApiError> {
        let mut body = JsonObject::new();
        body.insert("_links".to_string(), json!({ "self": href(self_url) }));
        body.insert("type".to_string(), Value::String(resource_type.to_string()));
        for (key, value) in resource {
            body.insert(key.clone(), value.clone());
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

        let mut link_map = JsonObject::new();
        link_map.insert("self".to_string(), href(&links.self_link));
        if let Some(next) = &links.next {
            link_map.insert("next".to_string(), href(next));
        }
        if let Some(previous) = &links.previous {
            link_map.insert("prev".to_string(), href(previous));
        }
        link_map.insert("first".to_string(), href(&links.first));
        link_map.insert("last".to_string(), href(&links.last));

        let members: Vec<Value> = resources
            .iter()
            .map(|(_, resource)| Value::Object(resource.clone()))
            .collect();

        let mut body = JsonObject::new();
        body.insert("_links".to_string(), Value::Object(link_map));
        body.insert(
            "_embedded".to_string(),
            json!({ resource_type: members }),
        );
        body.insert("type".to_string(), Value::String(resource_type.to_string()));
        body.insert("count".to_string(), Value::from(resources.len()));
        body.insert("total".to_string(), Value::from(total_count));
        Ok(body)
    }
}
