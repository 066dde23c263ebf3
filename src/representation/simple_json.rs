//! Plain `application/json`: no envelope on single documents, a flat
//! `items`/`page`/`limit`/`total` object on collections, identity body parsing.

use serde_json::Value;

use super::{Capability, Representation};
use crate::JsonObject;
use crate::errors::ApiError;
use crate::models::PageInfo;

pub struct SimpleJson;

impl Representation for SimpleJson {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn render_one(
        &self,
        _id: &str,
        _resource_type: &str,
        _self_url: &str,
        resource: &JsonObject,
    ) -> Result<JsonObject, ApiError> {
        Ok(resource.clone())
    }

    fn render_page(
        &self,
        _resource_type: &str,
        _self_url: &str,
        total_count: u64,
        page: PageInfo,
        resources: &[(String, JsonObject)],
    ) -> Result<JsonObject, ApiError> {
        let items: JsonObject = resources
            .iter()
            .map(|(id, resource)| (id.clone(), Value::Object(resource.clone())))
            .collect();

        let mut body = JsonObject::new();
        body.insert("items".to_string(), Value::Object(items));
        body.insert("page".to_string(), Value::from(page.current));
        body.insert("limit".to_string(), Value::from(page.size));
        body.insert("total".to_string(), Value::from(total_count));
        Ok(body)
    }

    fn parse_create_body(
        &self,
        input: &Value,
        _resource_type: &str,
    ) -> Result<JsonObject, ApiError> {
        as_body_object(input)
    }

    fn parse_update_body(
        &self,
        input: &Value,
        _resource_type: &str,
        _id: &str,
    ) -> Result<JsonObject, ApiError> {
        as_body_object(input)
    }
}

fn as_body_object(input: &Value) -> Result<JsonObject, ApiError> {
    input.as_object().cloned().ok_or_else(|| {
        ApiError::validation("Invalid body", "The body MUST defined and of type object")
    })
}
