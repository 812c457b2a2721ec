//! Backend query objects.
//!
//! [`SearchExpr`] is the search engine's native filter node; [`SearchQuery`]
//! is the compiled query handed to a backend, carrying the target index name
//! and a gathered filter expression.
//!
//! The backend's own query builder ANDs every condition added to it. The
//! compiler must instead fold conditions under the group's own connector, so
//! the gathered expression is managed through an explicit [`Accumulator`]
//! and merged with [`SearchQuery::apply`] rather than a builder chain.

use serde::{Deserialize, Serialize};

use crate::filter::{CanonicalLeaf, Connector, FilterValue, LookupOp};

/// A node of the search engine's filter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchExpr {
    /// A single field comparison.
    Comparison {
        field: String,
        op: LookupOp,
        value: FilterValue,
    },
    /// All sub-expressions must match.
    And(Vec<SearchExpr>),
    /// Any sub-expression may match.
    Or(Vec<SearchExpr>),
}

impl SearchExpr {
    /// The comparison expression for a lowered leaf.
    pub fn comparison(leaf: &CanonicalLeaf) -> Self {
        Self::Comparison {
            field: leaf.field.clone(),
            op: leaf.op.clone(),
            value: leaf.value.clone(),
        }
    }

    /// Fold `expr` into `acc` under `connector`.
    ///
    /// Same-connector accumulators absorb the new operand, so sibling
    /// conditions stay one flat n-ary node and keep their insertion order.
    pub fn combine(connector: Connector, acc: SearchExpr, expr: SearchExpr) -> SearchExpr {
        match (connector, acc) {
            (Connector::And, SearchExpr::And(mut nodes)) => {
                nodes.push(expr);
                SearchExpr::And(nodes)
            }
            (Connector::Or, SearchExpr::Or(mut nodes)) => {
                nodes.push(expr);
                SearchExpr::Or(nodes)
            }
            (Connector::And, acc) => SearchExpr::And(vec![acc, expr]),
            (Connector::Or, acc) => SearchExpr::Or(vec![acc, expr]),
        }
    }
}

/// Explicit connector accumulator for building a gathered expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    gathered: Option<SearchExpr>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `expr` into the gathered expression under `connector`. The first
    /// application seeds the accumulator.
    pub fn apply(&mut self, connector: Connector, expr: SearchExpr) {
        self.gathered = Some(match self.gathered.take() {
            None => expr,
            Some(acc) => SearchExpr::combine(connector, acc, expr),
        });
    }

    pub fn expression(&self) -> Option<&SearchExpr> {
        self.gathered.as_ref()
    }

    pub fn into_expression(self) -> Option<SearchExpr> {
        self.gathered
    }

    pub fn is_empty(&self) -> bool {
        self.gathered.is_none()
    }
}

/// A compiled search-backend query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    index: String,
    gathered: Option<SearchExpr>,
}

impl SearchQuery {
    /// An unfiltered query against the named index.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            gathered: None,
        }
    }

    /// The target index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Merge `expr` into this query's condition set under `connector`.
    pub fn apply(&mut self, connector: Connector, expr: SearchExpr) {
        self.gathered = Some(match self.gathered.take() {
            None => expr,
            Some(acc) => SearchExpr::combine(connector, acc, expr),
        });
    }

    /// The gathered filter expression; `None` matches everything.
    pub fn expression(&self) -> Option<&SearchExpr> {
        self.gathered.as_ref()
    }

    /// Render to the backend's textual filter syntax.
    pub fn to_query_string(&self) -> String {
        super::render::QueryStringRenderer::render(self)
    }
}
