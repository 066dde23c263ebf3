//! JSON:API (`application/vnd.api+json`): primary data under `data` with
//! `id`/`type`/`attributes`, pagination under `links` and `meta`. Request
//! bodies wear the same envelope and are validated strictly; on update the
//! envelope's `data.id` must match the path id.

use serde_json::{Value, json};

use super::{Capability, Representation};
use crate::JsonObject;
use crate::errors::ApiError;
use crate::models::PageInfo;
use crate::pagination::{RelativeUrl, pagination_links};

pub struct JsonApi;

fn invalid_body(detail: impl Into<String>) -> ApiError {
    ApiError::validation("Invalid body", detail)
}

/// Check the `data`/`data.type`/`data.attributes` envelope and hand back the
/// `data` object on success.
fn validate_body<'a>(input: &'a Value, resource_type: &str) -> Result<&'a JsonObject, ApiError> {
    let body = input
        .as_object()
        .ok_or_else(|| invalid_body("The body MUST defined and of type object"))?;
    let data = body
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid_body("The body MUST have a property named \"data\" of type object"))?;
    if data.get("type").and_then(Value::as_str) != Some(resource_type) {
        return Err(invalid_body(format!(
            "The body MUST have a property named 'data.type' with the value '{resource_type}'"
        )));
    }
    if !data.get("attributes").is_some_and(Value::is_object) {
        return Err(invalid_body(
            "The body MUST have a property named \"data.attributes\" of type object",
        ));
    }
    Ok(data)
}

fn attributes_of(data: &JsonObject) -> JsonObject {
    match data.get("attributes") {
        Some(Value::Object(attributes)) => attributes.clone(),
        _ => JsonObject::new(),
    }
}

fn resource_object(id: &str, resource_type: &str, resource: &JsonObject) -> Value {
    json!({
        "id": id,
        "type": resource_type,
        "attributes": resource
    })
}

impl Representation for JsonApi {
    fn content_type(&self) -> &'static str {
        "application/vnd.api+json"
    }

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn render_one(
        &self,
        id: &str,
        resource_type: &str,
        self_url: &str,
        resource: &JsonObject,
    ) -> Result<JsonObject, ApiError> {
        // Normalize the self URL (sorted query parameters) like the page links.
        let url = RelativeUrl::parse(self_url)?;

        let mut body = JsonObject::new();
        body.insert("data".to_string(), resource_object(id, resource_type, resource));
        body.insert("links".to_string(), json!({ "self": url.to_string() }));
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

        let data: Vec<Value> = resources
            .iter()
            .map(|(id, resource)| resource_object(id, resource_type, resource))
            .collect();

        let mut link_map = JsonObject::new();
        link_map.insert("self".to_string(), Value::String(links.self_link));
        link_map.insert("first".to_string(), Value::String(links.first));
        link_map.insert("last".to_string(), Value::String(links.last));
        if let Some(next) = links.next {
            link_map.insert("next".to_string(), Value::String(next));
        }
        if let Some(previous) = links.previous {
            link_map.insert("prev".to_string(), Value::String(previous));
        }

        let mut body = JsonObject::new();
        body.insert("data".to_string(), Value::Array(data));
        body.insert("links".to_string(), Value::Object(link_map));
        body.insert(
            "meta".to_string(),
            json!({
                "totalCount": total_count,
                "page": {
                    "size": page.size,
                    "count": links.total_pages,
                    "current": page.current
                }
            }),
        );
        Ok(body)
    }

    fn parse_create_body(
        &self,
        input: &Value,
        resource_type: &str,
    ) -> Result<JsonObject, ApiError> {
        let data = validate_body(input, resource_type)?;
        Ok(attributes_of(data))
    }

    fn parse_update_body(
        &self,
        input: &Value,
        resource_type: &str,
        id: &str,
    ) -> Result<JsonObject, ApiError> {
        let data = validate_body(input, resource_type)?;
        let body_id = data.get("id").and_then(Value::as_str).ok_or_else(|| {
            invalid_body("The body MUST have a property named \"data.id\" of type string")
        })?;
        if body_id != id {
            return Err(invalid_body(
                "The Id provided in the property named \"data.id\" must be the same as the id in the URL path parameter",
            ));
        }
        Ok(attributes_of(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn dto(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_one_envelope() {
        let body = JsonApi
            .render_one("1", "cats", "/cats/1", &dto(json!({"name": "felix"})))
            .unwrap();
        assert_eq!(
            Value::Object(body),
            json!({
                "data": {"id": "1", "type": "cats", "attributes": {"name": "felix"}},
                "links": {"self": "/cats/1"}
            })
        );
    }

    #[test]
    fn test_render_page_envelope() {
        let resources = vec![("a".to_string(), dto(json!({"name": "felix"})))];
        let body = JsonApi
            .render_page(
                "cats",
                "/cats",
                27,
                PageInfo {
                    size: 10,
                    current: 2,
                },
                &resources,
            )
            .unwrap();

        assert_eq!(
            body.get("data"),
            Some(&json!([
                {"id": "a", "type": "cats", "attributes": {"name": "felix"}}
            ]))
        );
        assert_eq!(
            body.get("meta"),
            Some(&json!({
                "totalCount": 27,
                "page": {"size": 10, "count": 3, "current": 2}
            }))
        );
        let links = body.get("links").unwrap();
        assert!(links.get("next").is_some());
        assert!(links.get("prev").is_some());
    }

    #[test]
    fn test_parse_create_extracts_attributes() {
        let input = json!({
            "data": {"type": "cats", "attributes": {"name": "felix"}}
        });
        let creator = JsonApi.parse_create_body(&input, "cats").unwrap();
        assert_eq!(Value::Object(creator), json!({"name": "felix"}));
    }

    #[test]
    fn test_parse_rejects_missing_data() {
        let err = JsonApi
            .parse_create_body(&json!({"attributes": {}}), "cats")
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.detail().contains("\"data\""));
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        let input = json!({
            "data": {"type": "dogs", "attributes": {}}
        });
        let err = JsonApi.parse_create_body(&input, "cats").unwrap_err();
        assert_eq!(
            err.detail(),
            "The body MUST have a property named 'data.type' with the value 'cats'"
        );
    }

    #[test]
    fn test_parse_rejects_missing_attributes() {
        let input = json!({"data": {"type": "cats"}});
        let err = JsonApi.parse_create_body(&input, "cats").unwrap_err();
        assert!(err.detail().contains("\"data.attributes\""));
    }

    #[test]
    fn test_update_requires_matching_id() {
        let input = json!({
            "data": {"type": "cats", "id": "2", "attributes": {"name": "felix"}}
        });
        let err = JsonApi.parse_update_body(&input, "cats", "1").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.detail(),
            "The Id provided in the property named \"data.id\" must be the same as the id in the URL path parameter"
        );
    }

    #[test]
    fn test_update_requires_string_id() {
        let input = json!({
            "data": {"type": "cats", "id": 1, "attributes": {}}
        });
        let err = JsonApi.parse_update_body(&input, "cats", "1").unwrap_err();
        assert_eq!(
            err.detail(),
            "The body MUST have a property named \"data.id\" of type string"
        );
    }

    #[test]
    fn test_update_accepts_matching_id() {
        let input = json!({
            "data": {"type": "cats", "id": "1", "attributes": {"name": "tom"}}
        });
        let updater = JsonApi.parse_update_body(&input, "cats", "1").unwrap();
        assert_eq!(Value::Object(updater), json!({"name": "tom"}));
    }
}
