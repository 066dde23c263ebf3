//! # Filter grammar, validation and translation
//!
//! Everything between the raw `filters` query parameter and the query document
//! handed to the backing store lives here.
//!
//! A filter tree is a JSON object whose keys are either dot-separated field
//! paths mapping to an operator/value object, or a root-level logical operator
//! (`$and`/`$or`) mapping to an array of nested trees:
//!
//! ```rust,ignore
//! // ?filters[age][$gte]=2&filters[age][$lt]=10&filters[name][$start]=fe
//! {
//!     "age": { "$gte": 2, "$lt": 10 },
//!     "name": { "$start": "fe" }
//! }
//! ```
//!
//! The pipeline is: [`validator::FilterValidator`] sanitizes the tree against
//! the controller's allow-lists, then [`translate::to_store_query`] rewrites
//! wire operators into store operators and merges redundant clauses. Both steps
//! are pure functions over immutable inputs.

pub mod operators;
pub mod sort;
pub mod translate;
pub mod validator;

pub use operators::{ListOperator, LogicalOperator, Operator, ValueOperator};
pub use sort::{SortDirection, parse_comma_list, parse_sort, to_store_sort};
pub use translate::{to_store_operator, to_store_query};
pub use validator::{FilterValidator, InvalidFilterPolicy};
