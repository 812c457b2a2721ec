// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! ORM-side filter tree.
//!
//! The boolean filter tree handed over by the database layer: a node is
//! either a single field lookup or a group of child nodes joined by a
//! connector. Groups always carry at least one child; the builder methods
//! maintain that invariant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::FilterError;

/// Boolean combinator joining sibling conditions in a filter group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connector {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, FilterError> {
        if s.eq_ignore_ascii_case("and") {
            Ok(Self::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Self::Or)
        } else {
            Err(FilterError::InvalidConnector(s.to_string()))
        }
    }
}

/// Lookup operator vocabulary.
///
/// `exact` and `in` get special handling during translation; the ordering
/// and substring operators are carried through to the backend expression.
/// Operator names outside the vocabulary are passed through verbatim as
/// [`LookupOp::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LookupOp {
    Exact,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    Other(String),
}

impl LookupOp {
    /// Parse an ORM lookup name; never fails, unknown names pass through.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "exact" => Self::Exact,
            "in" => Self::In,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            _ => Self::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact => "exact",
            Self::In => "in",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::Other(name) => name,
        }
    }

    /// Whether this is the membership operator, case-insensitively.
    pub fn is_membership(&self) -> bool {
        matches!(self, Self::In) || matches!(self, Self::Other(name) if name.eq_ignore_ascii_case("in"))
    }
}

impl fmt::Display for LookupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LookupOp {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<&str> for LookupOp {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<LookupOp> for String {
    fn from(op: LookupOp) -> Self {
        op.as_str().to_string()
    }
}

/// A lookup's right-hand value.
///
/// Lists appear only as membership candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_))
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<V: Into<FilterValue>> From<Vec<V>> for FilterValue {
    fn from(values: Vec<V>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// A single field/operator/value comparison from the ORM's filter language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    pub field: String,
    pub op: LookupOp,
    pub value: FilterValue,
}

impl Lookup {
    pub fn new(field: impl Into<String>, op: impl Into<LookupOp>, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            value: value.into(),
        }
    }
}

/// The ORM's boolean filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Leaf(Lookup),
    Group {
        connector: Connector,
        children: Vec<FilterNode>,
    },
}

impl FilterNode {
    /// A leaf comparison node.
    pub fn leaf(field: impl Into<String>, op: impl Into<LookupOp>, value: impl Into<FilterValue>) -> Self {
        Self::Leaf(Lookup::new(field, op, value))
    }

    /// Shorthand for an equality leaf.
    pub fn exact(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::leaf(field, LookupOp::Exact, value)
    }

    /// A group node with an explicit connector.
    pub fn group(connector: Connector, children: Vec<FilterNode>) -> Self {
        Self::Group { connector, children }
    }

    /// Combine with AND.
    pub fn and(self, other: FilterNode) -> Self {
        Self::Group {
            connector: Connector::And,
            children: vec![self, other],
        }
    }

    /// Combine with OR.
    pub fn or(self, other: FilterNode) -> Self {
        Self::Group {
            connector: Connector::Or,
            children: vec![self, other],
        }
    }
}
