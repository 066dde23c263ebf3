//! # Filter validation
//!
//! [`FilterValidator`] walks a user-submitted filter tree and checks every key
//! against an allow-list of operators and fields, producing a new, sanitized
//! tree. The walk is total (every key at every level is visited exactly once)
//! and never mutates its input.
//!
//! The reaction to an invalid entry is driven by [`InvalidFilterPolicy`]:
//! reject the whole request, silently drop the entry, or keep it untouched.
//! A separate switch escapes disallowed logical operators with a leading
//! backslash so a backing store treats them as literal field names.
//!
//! Logical operators (`$and`/`$or`) are only meaningful at the root of the
//! tree. Each element of a logical branch is re-validated as a complete filter
//! tree with the logical operators stripped from the allow-list, so a `$or`
//! nested inside a `$or` branch is rejected or removed like any other
//! disallowed operator.

use serde_json::Value;

use super::operators::{LogicalOperator, Operator};
use crate::JsonObject;
use crate::errors::ApiError;

/// How the validator reacts to a disallowed field, operator or value shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidFilterPolicy {
    /// Reject the request with a 400 validation error.
    #[default]
    Throw,
    /// Drop the offending entry and keep validating.
    Remove,
    /// Keep the entry untouched.
    DoNothing,
}

/// Validates and sanitizes filter trees against per-controller allow-lists.
///
/// Construct once per request (it borrows the controller's allow-lists) and
/// call [`validate`](Self::validate).
#[derive(Debug, Clone)]
pub struct FilterValidator<'a> {
    allowed_operators: &'a [Operator],
    allowed_fields: &'a [String],
    policy: InvalidFilterPolicy,
    escape_invalid_logical: bool,
}

impl<'a> FilterValidator<'a> {
    #[must_use]
    pub fn new(
        allowed_operators: &'a [Operator],
        allowed_fields: &'a [String],
        policy: InvalidFilterPolicy,
    ) -> Self {
        Self {
            allowed_operators,
            allowed_fields,
            policy,
            escape_invalid_logical: false,
        }
    }

    /// When enabled, a disallowed logical operator key is kept but prefixed
    /// with a literal backslash instead of following the policy.
    #[must_use]
    pub fn escape_invalid_logical(mut self, escape: bool) -> Self {
        self.escape_invalid_logical = escape;
        self
    }

    /// Validate a filter tree. `None` stays `None`; a tree comes back as a new
    /// sanitized tree.
    ///
    /// # Errors
    ///
    /// Returns a validation [`ApiError`] for the first invalid entry when the
    /// policy is [`InvalidFilterPolicy::Throw`].
    pub fn validate(&self, input: Option<&JsonObject>) -> Result<Option<JsonObject>, ApiError> {
        match input {
            None => Ok(None),
            Some(tree) => self.validate_tree(tree, true).map(Some),
        }
    }

    fn operator_allowed(&self, op: Operator) -> bool {
        self.allowed_operators.contains(&op)
    }

    fn field_allowed(&self, name: &str) -> bool {
        self.allowed_fields.iter().any(|field| field == name)
    }

    /// One level of the tree: logical branches and field entries.
    /// `logical_allowed` is false inside a logical branch element.
    fn validate_tree(
        &self,
        tree: &JsonObject,
        logical_allowed: bool,
    ) -> Result<JsonObject, ApiError> {
        let mut out = JsonObject::new();
        for (key, value) in tree {
            if let Some(logical) = LogicalOperator::parse(key) {
                if logical_allowed && self.operator_allowed(Operator::Logical(logical)) {
                    out.insert(key.clone(), self.validate_branches(value)?);
                } else if self.escape_invalid_logical {
                    out.insert(format!("\\{key}"), value.clone());
                } else if let Some((kept_key, kept_value)) = self.on_invalid(
                    key,
                    value,
                    format!("The logical operator \"{key}\" is not allowed"),
                )? {
                    out.insert(kept_key, kept_value);
                }
                continue;
            }

            if self.field_allowed(key) {
                out.insert(key.clone(), self.validate_field_value(value)?);
            } else if let Some((kept_key, _)) =
                self.on_invalid(key, value, format!("The field \"{key}\" is not allowed"))?
            {
                // DoNothing keeps the field, but its operator map is still
                // subject to the same checks as an allowed field.
                out.insert(kept_key, self.validate_field_value(value)?);
            }
        }
        Ok(out)
    }

    /// The array under an allowed logical operator. Each object element is a
    /// complete sub-tree, re-validated with logical operators excluded. A
    /// non-array value, an empty array and non-object elements pass through
    /// unchanged.
    fn validate_branches(&self, value: &Value) -> Result<Value, ApiError> {
        match value {
            Value::Array(elements) => {
                let mut out = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        Value::Object(sub_tree) => {
                            out.push(Value::Object(self.validate_tree(sub_tree, false)?));
                        }
                        other => out.push(other.clone()),
                    }
                }
                Ok(Value::Array(out))
            }
            other => Ok(other.clone()),
        }
    }

    /// The operator map under a field. Non-object values pass through.
    fn validate_field_value(&self, value: &Value) -> Result<Value, ApiError> {
        let Value::Object(operator_map) = value else {
            return Ok(value.clone());
        };

        let mut out = JsonObject::new();
        for (token, op_value) in operator_map {
            match Operator::parse(token) {
                Some(Operator::List(op)) if self.operator_allowed(Operator::List(op)) => {
                    if is_primitive(op_value) {
                        // Permissive coercion: a lone primitive becomes a
                        // singleton list.
                        out.insert(token.clone(), Value::Array(vec![op_value.clone()]));
                    } else if op_value.is_array() {
                        out.insert(token.clone(), op_value.clone());
                    } else if let Some((kept_key, kept_value)) = self.on_invalid(
                        token,
                        op_value,
                        format!(
                            "The value of operator \"{token}\" must be an array (provided type: \"{}\")",
                            json_type_name(op_value)
                        ),
                    )? {
                        out.insert(kept_key, kept_value);
                    }
                }
                Some(Operator::Value(op)) if self.operator_allowed(Operator::Value(op)) => {
                    if is_primitive(op_value) {
                        out.insert(token.clone(), op_value.clone());
                    } else if let Some((kept_key, kept_value)) = self.on_invalid(
                        token,
                        op_value,
                        format!(
                            "The value of operator \"{token}\" must be a primitive (provided type: \"{}\")",
                            json_type_name(op_value)
                        ),
                    )? {
                        out.insert(kept_key, kept_value);
                    }
                }
                // Logical operators under a field, disallowed operators and
                // unknown tokens all land here.
                _ => {
                    if let Some((kept_key, kept_value)) = self.on_invalid(
                        token,
                        op_value,
                        format!("The operator \"{token}\" is not allowed"),
                    )? {
                        out.insert(kept_key, kept_value);
                    }
                }
            }
        }
        Ok(Value::Object(out))
    }

    fn on_invalid(
        &self,
        key: &str,
        value: &Value,
        detail: String,
    ) -> Result<Option<(String, Value)>, ApiError> {
        match self.policy {
            InvalidFilterPolicy::Throw => {
                Err(ApiError::validation("Invalid search criteria", detail))
            }
            InvalidFilterPolicy::Remove => {
                tracing::debug!(key = %key, detail = %detail, "dropped invalid filter entry");
                Ok(None)
            }
            InvalidFilterPolicy::DoNothing => Ok(Some((key.to_string(), value.clone()))),
        }
    }
}

/// JSON primitives accepted as operator values: string, number, boolean, null.
fn is_primitive(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::operators::{ListOperator, ValueOperator};
    use serde_json::json;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn as_object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn validate(
        tree: Value,
        operators: &[Operator],
        allowed: &[String],
        policy: InvalidFilterPolicy,
    ) -> Result<Option<JsonObject>, ApiError> {
        let tree = as_object(tree);
        FilterValidator::new(operators, allowed, policy).validate(Some(&tree))
    }

    #[test]
    fn test_none_input_stays_none() {
        let operators = Operator::all();
        let allowed = fields(&["name"]);
        let validator =
            FilterValidator::new(&operators, &allowed, InvalidFilterPolicy::Throw);
        assert!(validator.validate(None).unwrap().is_none());
    }

    #[test]
    fn test_valid_tree_passes_unchanged() {
        let operators = Operator::all();
        let allowed = fields(&["name", "age"]);
        let tree = json!({"name": {"$eq": "felix"}, "age": {"$gt": 2, "$lt": 10}});
        let result = validate(tree.clone(), &operators, &allowed, InvalidFilterPolicy::Throw)
            .unwrap()
            .unwrap();
        assert_eq!(Value::Object(result), tree);
    }

    #[test]
    fn test_list_value_coercion_to_singleton() {
        let operators = vec![Operator::List(ListOperator::In)];
        let allowed = fields(&["foo"]);
        let result = validate(
            json!({"foo": {"$in": "x"}}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Throw,
        )
        .unwrap()
        .unwrap();
        assert_eq!(Value::Object(result), json!({"foo": {"$in": ["x"]}}));
    }

    #[test]
    fn test_list_value_null_coerced() {
        let operators = vec![Operator::List(ListOperator::NotIn)];
        let allowed = fields(&["foo"]);
        let result = validate(
            json!({"foo": {"$nin": null}}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Throw,
        )
        .unwrap()
        .unwrap();
        assert_eq!(Value::Object(result), json!({"foo": {"$nin": [null]}}));
    }

    #[test]
    fn test_list_value_object_rejected() {
        let operators = vec![Operator::List(ListOperator::In)];
        let allowed = fields(&["foo"]);
        let err = validate(
            json!({"foo": {"$in": {"bad": 1}}}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Throw,
        )
        .unwrap_err();
        assert!(err.detail().contains("must be an array"));
    }

    #[test]
    fn test_value_operator_rejects_non_primitive() {
        let operators = Operator::all();
        let allowed = fields(&["foo"]);
        let err = validate(
            json!({"foo": {"$eq": [1, 2]}}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Throw,
        )
        .unwrap_err();
        assert!(err.detail().contains("must be a primitive"));
    }

    #[test]
    fn test_disallowed_field_throws() {
        let operators = Operator::all();
        let allowed = fields(&["name"]);
        let err = validate(
            json!({"secret": {"$eq": 1}}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Throw,
        )
        .unwrap_err();
        assert_eq!(err.detail(), "The field \"secret\" is not allowed");
    }

    #[test]
    fn test_disallowed_field_removed() {
        let operators = Operator::all();
        let allowed = fields(&["name"]);
        let result = validate(
            json!({"secret": {"$eq": 1}, "name": {"$eq": "ok"}}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Remove,
        )
        .unwrap()
        .unwrap();
        assert_eq!(Value::Object(result), json!({"name": {"$eq": "ok"}}));
    }

    #[test]
    fn test_disallowed_operator_removed() {
        let operators = vec![Operator::Value(ValueOperator::Equals)];
        let allowed = fields(&["name"]);
        let result = validate(
            json!({"name": {"$eq": "a", "$regex": "b"}}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Remove,
        )
        .unwrap()
        .unwrap();
        assert_eq!(Value::Object(result), json!({"name": {"$eq": "a"}}));
    }

    #[test]
    fn test_logical_branch_elements_validated() {
        let operators = Operator::all();
        let allowed = fields(&["a", "b"]);
        let tree = json!({"$or": [{"a": {"$eq": 1}}, {"b": {"$in": 2}}]});
        let result = validate(tree, &operators, &allowed, InvalidFilterPolicy::Throw)
            .unwrap()
            .unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"$or": [{"a": {"$eq": 1}}, {"b": {"$in": [2]}}]})
        );
    }

    #[test]
    fn test_nested_logical_never_promoted() {
        // A $or inside a $or branch is a disallowed operator at that position,
        // never a second level of logical composition.
        let operators = Operator::all();
        let allowed = fields(&["a"]);
        let tree = json!({"$or": [{"$or": [{"a": {"$eq": 1}}]}]});
        let err = validate(tree.clone(), &operators, &allowed, InvalidFilterPolicy::Throw)
            .unwrap_err();
        assert_eq!(err.detail(), "The logical operator \"$or\" is not allowed");

        let removed = validate(tree, &operators, &allowed, InvalidFilterPolicy::Remove)
            .unwrap()
            .unwrap();
        assert_eq!(Value::Object(removed), json!({"$or": [{}]}));
    }

    #[test]
    fn test_logical_operator_not_in_allow_list() {
        let operators = vec![Operator::Value(ValueOperator::Equals)];
        let allowed = fields(&["a"]);
        let err = validate(
            json!({"$and": [{"a": {"$eq": 1}}]}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Throw,
        )
        .unwrap_err();
        assert_eq!(err.detail(), "The logical operator \"$and\" is not allowed");
    }

    #[test]
    fn test_escape_invalid_logical() {
        let operators = vec![Operator::Value(ValueOperator::Equals)];
        let allowed = fields(&["a"]);
        let tree = as_object(json!({"$or": [{"a": {"$eq": 1}}]}));
        let result = FilterValidator::new(&operators, &allowed, InvalidFilterPolicy::Throw)
            .escape_invalid_logical(true)
            .validate(Some(&tree))
            .unwrap()
            .unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"\\$or": [{"a": {"$eq": 1}}]})
        );
    }

    #[test]
    fn test_empty_array_under_logical_passes_through() {
        let operators = Operator::all();
        let allowed = fields(&["a"]);
        let result = validate(
            json!({"$or": []}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Throw,
        )
        .unwrap()
        .unwrap();
        assert_eq!(Value::Object(result), json!({"$or": []}));
    }

    #[test]
    fn test_null_under_logical_passes_through() {
        let operators = Operator::all();
        let allowed = fields(&["a"]);
        let result = validate(
            json!({"$or": null}),
            &operators,
            &allowed,
            InvalidFilterPolicy::Throw,
        )
        .unwrap()
        .unwrap();
        assert_eq!(Value::Object(result), json!({"$or": null}));
    }

    #[test]
    fn test_do_nothing_is_idempotent() {
        let operators = vec![Operator::Value(ValueOperator::Equals)];
        let allowed = fields(&["a"]);
        let tree = as_object(json!({
            "a": {"$eq": 1, "$regex": "x"},
            "hidden": {"$gt": 2},
            "$or": [{"a": {"$eq": 3}}]
        }));
        let validator =
            FilterValidator::new(&operators, &allowed, InvalidFilterPolicy::DoNothing);
        let once = validator.validate(Some(&tree)).unwrap().unwrap();
        let twice = validator.validate(Some(&once)).unwrap().unwrap();
        assert_eq!(once, twice);
        // DoNothing keeps everything.
        assert_eq!(Value::Object(once), Value::Object(tree));
    }

    #[test]
    fn test_input_not_mutated() {
        let operators = vec![Operator::List(ListOperator::In)];
        let allowed = fields(&["foo"]);
        let tree = as_object(json!({"foo": {"$in": "x"}}));
        let original = tree.clone();
        let _ = FilterValidator::new(&operators, &allowed, InvalidFilterPolicy::Throw)
            .validate(Some(&tree))
            .unwrap();
        assert_eq!(tree, original);
    }
}
