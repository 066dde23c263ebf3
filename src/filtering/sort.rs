//! Sort and comma-list parsing for the query-parameter surface.

use serde_json::Value;

use crate::JsonObject;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// The numeric form the store sort document carries (1 / -1).
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Split a comma-separated parameter into trimmed, non-empty segments.
///
/// A comma-only or empty string yields an empty list, not "all fields".
#[must_use]
pub fn parse_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse sort field names into ordered `(field, direction)` pairs.
///
/// A `-` prefix marks descending order. Input order is preserved.
#[must_use]
pub fn parse_sort(fields: &[String]) -> Vec<(String, SortDirection)> {
    fields
        .iter()
        .map(|item| match item.strip_prefix('-') {
            Some(name) => (name.to_string(), SortDirection::Descending),
            None => (item.clone(), SortDirection::Ascending),
        })
        .collect()
}

/// Build the store sort document (`field -> 1 | -1`) from sort field names.
#[must_use]
pub fn to_store_sort(fields: &[String]) -> JsonObject {
    parse_sort(fields)
        .into_iter()
        .map(|(name, direction)| (name, Value::from(direction.as_i64())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comma_list_trims_and_drops_empty() {
        assert_eq!(parse_comma_list("a, b,,c "), vec!["a", "b", "c"]);
        assert_eq!(parse_comma_list(" name,hex"), vec!["name", "hex"]);
    }

    #[test]
    fn test_comma_only_yields_empty_list() {
        assert!(parse_comma_list("").is_empty());
        assert!(parse_comma_list(",").is_empty());
        assert!(parse_comma_list(" , , ").is_empty());
    }

    #[test]
    fn test_sort_prefix_and_order() {
        let input = vec!["name".to_string(), "-age".to_string()];
        let parsed = parse_sort(&input);
        assert_eq!(
            parsed,
            vec![
                ("name".to_string(), SortDirection::Ascending),
                ("age".to_string(), SortDirection::Descending),
            ]
        );
    }

    #[test]
    fn test_store_sort_preserves_input_order() {
        let input = vec!["name".to_string(), "-age".to_string()];
        let sort = to_store_sort(&input);
        assert_eq!(
            serde_json::to_string(&Value::Object(sort)).unwrap(),
            r#"{"name":1,"age":-1}"#
        );
    }

    #[test]
    fn test_dotted_paths_kept_verbatim() {
        let input = vec!["-owner.name".to_string()];
        let sort = to_store_sort(&input);
        assert_eq!(Value::Object(sort), json!({"owner.name": -1}));
    }
}
