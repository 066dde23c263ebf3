//! The filter operator vocabulary.
//!
//! Every operator accepted in a filter tree is a member of one of three closed
//! enums, each with a stable wire token. Tokens are part of the query-string
//! contract with existing clients and must not change.

use std::fmt;

/// Operators comparing a field against a single primitive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOperator {
    /// `$eq` - equal to.
    Equals,
    /// `$neq` - not equal to.
    NotEquals,
    /// `$gt` - greater than.
    GreaterThan,
    /// `$gte` - greater than or equal to.
    GreaterOrEquals,
    /// `$lt` - lower than.
    LowerThan,
    /// `$lte` - lower than or equal to.
    LowerOrEquals,
    /// `$start` - string starts with the value.
    StartsWith,
    /// `$end` - string ends with the value.
    EndsWith,
    /// `$regex` - string matches the regular expression.
    Regex,
    /// `$null` - field is null.
    IsNull,
    /// `$def` - field is defined (not null).
    IsDefined,
}

impl ValueOperator {
    pub const ALL: [Self; 11] = [
        Self::Equals,
        Self::NotEquals,
        Self::GreaterThan,
        Self::GreaterOrEquals,
        Self::LowerThan,
        Self::LowerOrEquals,
        Self::StartsWith,
        Self::EndsWith,
        Self::Regex,
        Self::IsNull,
        Self::IsDefined,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equals => "$eq",
            Self::NotEquals => "$neq",
            Self::GreaterThan => "$gt",
            Self::GreaterOrEquals => "$gte",
            Self::LowerThan => "$lt",
            Self::LowerOrEquals => "$lte",
            Self::StartsWith => "$start",
            Self::EndsWith => "$end",
            Self::Regex => "$regex",
            Self::IsNull => "$null",
            Self::IsDefined => "$def",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }
}

/// Operators comparing a field against a list of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListOperator {
    /// `$in` - matches any of the listed values.
    In,
    /// `$nin` - matches none of the listed values.
    NotIn,
}

impl ListOperator {
    pub const ALL: [Self; 2] = [Self::In, Self::NotIn];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::In => "$in",
            Self::NotIn => "$nin",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }
}

/// Root-level combinators composing several sub-trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    /// `$and` - every sub-tree must match.
    And,
    /// `$or` - at least one sub-tree must match.
    Or,
}

impl LogicalOperator {
    pub const ALL: [Self; 2] = [Self::And, Self::Or];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::And => "$and",
            Self::Or => "$or",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }
}

/// Any operator of the filter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Value(ValueOperator),
    List(ListOperator),
    Logical(LogicalOperator),
}

impl Operator {
    /// The full vocabulary, in wire-documentation order: value operators, then
    /// list operators, then logical operators.
    #[must_use]
    pub fn all() -> Vec<Self> {
        ValueOperator::ALL
            .into_iter()
            .map(Self::Value)
            .chain(ListOperator::ALL.into_iter().map(Self::List))
            .chain(LogicalOperator::ALL.into_iter().map(Self::Logical))
            .collect()
    }

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Value(op) => op.token(),
            Self::List(op) => op.token(),
            Self::Logical(op) => op.token(),
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        ValueOperator::parse(token)
            .map(Self::Value)
            .or_else(|| ListOperator::parse(token).map(Self::List))
            .or_else(|| LogicalOperator::parse(token).map(Self::Logical))
    }

    #[must_use]
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::Logical(_))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
