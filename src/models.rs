//! Request-surface types shared across the crate.

use serde::Deserialize;

use crate::JsonObject;

/// Query parameters of a list request, after the framework layer has decoded
/// the deep-object query string.
///
/// # Filtering
/// `filters` follows the filter-tree grammar, e.g.
/// `filters[age][$gte]=2&filters[name][$start]=fe`.
///
/// # Pagination
/// `page[size]` and `page[number]` are positive integers, clamped by
/// [`PageBounds`] before they reach the pagination calculator.
///
/// # Projection and sorting
/// `fields` and `sort` are comma-separated lists of dot-path field names;
/// sort names take an optional `-` prefix for descending order.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Decoded filter tree, e.g. `{"age": {"$gte": 2}}`.
    pub filters: Option<JsonObject>,
    /// Requested page size (`page[size]`).
    pub page_size: Option<u64>,
    /// Requested 1-based page number (`page[number]`).
    pub page_number: Option<u64>,
    /// Comma-separated projection list, e.g. `name,hex`.
    pub fields: Option<String>,
    /// Comma-separated sort list, e.g. `name,-age`.
    pub sort: Option<String>,
}

/// The page a request resolved to: size and 1-based current number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub size: u64,
    pub current: u64,
}

/// Per-controller page-size bounds: the default used when the client sends
/// nothing, and the ceiling the requested size is clamped to.
#[derive(Debug, Clone, Copy)]
pub struct PageBounds {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PageBounds {
    fn default() -> Self {
        Self {
            default_size: 10,
            max_size: 200,
        }
    }
}

impl PageBounds {
    /// Clamp client-supplied pagination numbers into a [`PageInfo`]: size into
    /// `[1, max_size]` falling back to the default, number into `[1, ∞)`
    /// falling back to 1.
    #[must_use]
    pub fn clamp(&self, size: Option<u64>, number: Option<u64>) -> PageInfo {
        PageInfo {
            size: bound(Some(1), size, Some(self.max_size), self.default_size),
            current: bound(Some(1), number, None, 1),
        }
    }
}

/// Clamp `value` between optional bounds, substituting `fallback` when absent.
#[must_use]
pub fn bound(min: Option<u64>, value: Option<u64>, max: Option<u64>, fallback: u64) -> u64 {
    let mut final_value = value.unwrap_or(fallback);
    if let Some(min) = min {
        final_value = final_value.max(min);
    }
    if let Some(max) = max {
        final_value = final_value.min(max);
    }
    final_value
}
