//! # Operator translation
//!
//! Turns an already-validated filter tree into the query document handed to the
//! backing store. Most operators map one-to-one; `$start`/`$end` become an
//! anchored `$regex` with the value's metacharacters escaped, and `$null`/
//! `$def`/`$neq` normalize onto the store's equality family.
//!
//! A store cannot express two native regex clauses or two native not-equals
//! clauses on the same field, so redundant clauses are merged per field after
//! translation. The merge order is a byte-stable output contract for existing
//! clients and must not be rearranged.

use serde_json::Value;

use super::operators::{ListOperator, LogicalOperator, Operator, ValueOperator};
use crate::JsonObject;

/// Store-side operator tokens the wire vocabulary normalizes onto.
const STORE_REGEX: &str = "$regex";
const STORE_NOT_EQUALS: &str = "$ne";
const STORE_NOT_IN: &str = "$nin";
const STORE_MATCH_ALL: &str = "$all";

/// Translate one wire operator/value pair into its store equivalent.
///
/// `$start` and `$end` anchor the value as a regex pattern with all regex
/// metacharacters escaped, so `"50$"` matches the literal string and nothing
/// else. `$null` and `$def` force the value to `null` under equality /
/// not-equals. Everything else passes through.
#[must_use]
pub fn to_store_operator(operator: Operator, value: Value) -> (String, Value) {
    match operator {
        Operator::Value(ValueOperator::StartsWith) => (
            STORE_REGEX.to_string(),
            Value::String(format!("^{}", regex::escape(&value_to_pattern(&value)))),
        ),
        Operator::Value(ValueOperator::EndsWith) => (
            STORE_REGEX.to_string(),
            Value::String(format!("{}$", regex::escape(&value_to_pattern(&value)))),
        ),
        Operator::Value(ValueOperator::IsNull) => ("$eq".to_string(), Value::Null),
        Operator::Value(ValueOperator::IsDefined) => (STORE_NOT_EQUALS.to_string(), Value::Null),
        Operator::Value(ValueOperator::NotEquals) => (STORE_NOT_EQUALS.to_string(), value),
        other => (other.token().to_string(), value),
    }
}

/// Translate a validated filter tree into a store query document.
///
/// Logical branches recurse: each element of the `$and`/`$or` array is
/// translated as a full sub-query. `None` becomes the empty (match-everything)
/// query.
#[must_use]
pub fn to_store_query(tree: Option<&JsonObject>) -> JsonObject {
    let Some(tree) = tree else {
        return JsonObject::new();
    };

    let mut query = JsonObject::new();
    for (key, value) in tree {
        if LogicalOperator::parse(key).is_some() {
            let branches = match value {
                Value::Array(elements) => Value::Array(
                    elements
                        .iter()
                        .map(|element| match element {
                            Value::Object(sub_tree) => Value::Object(visit_query(sub_tree)),
                            other => other.clone(),
                        })
                        .collect(),
                ),
                other => other.clone(),
            };
            query.insert(key.clone(), branches);
        } else {
            query.insert(key.clone(), visit_field_value(value));
        }
    }
    query
}

fn visit_query(sub_tree: &JsonObject) -> JsonObject {
    sub_tree
        .iter()
        .map(|(field, value)| (field.clone(), visit_field_value(value)))
        .collect()
}

fn visit_field_value(value: &Value) -> Value {
    match value {
        Value::Object(operator_map) => Value::Object(visit_field(operator_map)),
        other => other.clone(),
    }
}

/// Translate the operator map of one field, then apply the merge rules in
/// order: regex clauses, not-equals clauses, not-in clauses.
fn visit_field(operator_map: &JsonObject) -> JsonObject {
    let mut clauses: Vec<(String, Value)> = operator_map
        .iter()
        .map(|(token, value)| match Operator::parse(token) {
            Some(operator) => to_store_operator(operator, value.clone()),
            None => (token.clone(), value.clone()),
        })
        .collect();

    // Rule 1: several regex clauses fold into a single match-all-patterns
    // clause. Patterns stay strings; the store driver compiles them.
    let regex_count = clauses.iter().filter(|(t, _)| t == STORE_REGEX).count();
    if regex_count > 1 {
        let patterns: Vec<Value> = clauses
            .iter()
            .filter(|(t, _)| t == STORE_REGEX)
            .map(|(_, v)| v.clone())
            .collect();
        clauses.retain(|(t, _)| t != STORE_REGEX);
        clauses.push((STORE_MATCH_ALL.to_string(), Value::Array(patterns)));
    }

    // Rule 2: several not-equals clauses fold into one not-in list.
    let ne_count = clauses.iter().filter(|(t, _)| t == STORE_NOT_EQUALS).count();
    if ne_count > 1 {
        let excluded: Vec<Value> = clauses
            .iter()
            .filter(|(t, _)| t == STORE_NOT_EQUALS)
            .map(|(_, v)| v.clone())
            .collect();
        clauses.retain(|(t, _)| t != STORE_NOT_EQUALS);
        clauses.push((STORE_NOT_IN.to_string(), Value::Array(excluded)));
    }

    // Rule 3: several not-in lists (including one produced by rule 2)
    // concatenate, duplicates allowed, insertion order preserved.
    let nin_count = clauses.iter().filter(|(t, _)| t == STORE_NOT_IN).count();
    if nin_count > 1 {
        let mut excluded = Vec::new();
        for (_, v) in clauses.iter().filter(|(t, _)| t == STORE_NOT_IN) {
            match v {
                Value::Array(items) => excluded.extend(items.iter().cloned()),
                other => excluded.push(other.clone()),
            }
        }
        clauses.retain(|(t, _)| t != STORE_NOT_IN);
        clauses.push((STORE_NOT_IN.to_string(), Value::Array(excluded)));
    }

    clauses.into_iter().collect()
}

/// The string a value anchors as, mirroring JavaScript `String(value)`.
fn value_to_pattern(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use serde_json::json;

    fn as_object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_starts_with_becomes_anchored_regex() {
        let (op, value) = to_store_operator(
            Operator::Value(ValueOperator::StartsWith),
            json!("hello"),
        );
        assert_eq!(op, "$regex");
        assert_eq!(value, json!("^hello"));
    }

    #[test]
    fn test_ends_with_escapes_metacharacters() {
        let (op, value) = to_store_operator(Operator::Value(ValueOperator::EndsWith), json!("50$"));
        assert_eq!(op, "$regex");
        let pattern = value.as_str().unwrap();
        let compiled = Regex::new(pattern).unwrap();
        // The literal suffix matches; the dollar sign elsewhere does not.
        assert!(compiled.is_match("price is 50$"));
        assert!(!compiled.is_match("50$ is the price"));
    }

    #[test]
    fn test_starts_with_escaping_round_trip() {
        let (_, value) =
            to_store_operator(Operator::Value(ValueOperator::StartsWith), json!("a.b*"));
        let compiled = Regex::new(value.as_str().unwrap()).unwrap();
        assert!(compiled.is_match("a.b* and more"));
        assert!(!compiled.is_match("aXbY and more"));
        assert!(!compiled.is_match("prefix a.b*"));
    }

    #[test]
    fn test_null_and_def_force_null() {
        assert_eq!(
            to_store_operator(Operator::Value(ValueOperator::IsNull), json!(1)),
            ("$eq".to_string(), Value::Null)
        );
        assert_eq!(
            to_store_operator(Operator::Value(ValueOperator::IsDefined), json!(true)),
            ("$ne".to_string(), Value::Null)
        );
    }

    #[test]
    fn test_neq_passes_value_through() {
        assert_eq!(
            to_store_operator(Operator::Value(ValueOperator::NotEquals), json!("bar")),
            ("$ne".to_string(), json!("bar"))
        );
    }

    #[test]
    fn test_identity_operators() {
        for (op, token) in [
            (ValueOperator::Equals, "$eq"),
            (ValueOperator::GreaterThan, "$gt"),
            (ValueOperator::GreaterOrEquals, "$gte"),
            (ValueOperator::LowerThan, "$lt"),
            (ValueOperator::LowerOrEquals, "$lte"),
            (ValueOperator::Regex, "$regex"),
        ] {
            assert_eq!(
                to_store_operator(Operator::Value(op), json!(7)),
                (token.to_string(), json!(7))
            );
        }
        assert_eq!(
            to_store_operator(Operator::List(ListOperator::In), json!([1])),
            ("$in".to_string(), json!([1]))
        );
    }

    #[test]
    fn test_empty_query() {
        assert!(to_store_query(None).is_empty());
        assert!(to_store_query(Some(&JsonObject::new())).is_empty());
    }

    #[test]
    fn test_simple_field_translation() {
        let tree = as_object(json!({"name": {"$neq": "felix"}, "age": {"$gte": 2}}));
        let query = to_store_query(Some(&tree));
        assert_eq!(
            Value::Object(query),
            json!({"name": {"$ne": "felix"}, "age": {"$gte": 2}})
        );
    }

    #[test]
    fn test_regex_merge() {
        let tree = as_object(json!({"name": {"$start": "he", "$end": "lo"}}));
        let query = to_store_query(Some(&tree));
        assert_eq!(
            Value::Object(query),
            json!({"name": {"$all": ["^he", "lo$"]}})
        );
    }

    #[test]
    fn test_ne_family_merge_order_is_byte_stable() {
        // This exact output order is a compatibility contract: original $nin
        // values first, then the merged not-equals values in tree order.
        let tree = as_object(json!({
            "foo": {"$def": true, "$neq": "bar", "$nin": ["hello", "world"]}
        }));
        let query = to_store_query(Some(&tree));
        assert_eq!(
            serde_json::to_string(&Value::Object(query)).unwrap(),
            r#"{"foo":{"$nin":["hello","world",null,"bar"]}}"#
        );
    }

    #[test]
    fn test_single_clauses_left_alone() {
        let tree = as_object(json!({"foo": {"$neq": "bar", "$gt": 1}}));
        let query = to_store_query(Some(&tree));
        assert_eq!(
            Value::Object(query),
            json!({"foo": {"$ne": "bar", "$gt": 1}})
        );
    }

    #[test]
    fn test_logical_branches_recurse() {
        let tree = as_object(json!({
            "$or": [
                {"a": {"$start": "x", "$end": "y"}},
                {"b": {"$null": 1}}
            ]
        }));
        let query = to_store_query(Some(&tree));
        assert_eq!(
            Value::Object(query),
            json!({
                "$or": [
                    {"a": {"$all": ["^x", "y$"]}},
                    {"b": {"$eq": null}}
                ]
            })
        );
    }

    #[test]
    fn test_numeric_value_anchors_as_string() {
        let (_, value) = to_store_operator(Operator::Value(ValueOperator::StartsWith), json!(42));
        assert_eq!(value, json!("^42"));
    }
}
