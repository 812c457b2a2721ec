// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory document index.
//!
//! Reference backend used in tests and development. Writes honor the
//! indexing gate at every decision point, and query execution follows the
//! real backend's contract: matching documents come back in descending rank
//! order.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::filter::{FilterValue, LookupOp};
use crate::gate;
use crate::metrics;
use crate::query::{SearchExpr, SearchQuery};

#[derive(Debug, Clone)]
struct StoredDocument {
    content: Value,
    rank: Option<i64>,
}

/// A small in-memory search index over JSON documents.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    documents: BTreeMap<String, StoredDocument>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document. Returns whether the write went through; indexing
    /// may be suspended on this thread.
    pub fn put(&mut self, id: impl Into<String>, content: Value, rank: Option<i64>) -> bool {
        if !gate::indexing_is_enabled() {
            debug!("indexing suspended on this thread; dropping document write");
            return false;
        }
        self.documents.insert(id.into(), StoredDocument { content, rank });
        true
    }

    /// Remove a document. Gated like [`MemoryIndex::put`]; returns whether a
    /// document was actually removed.
    pub fn delete(&mut self, id: &str) -> bool {
        if !gate::indexing_is_enabled() {
            debug!("indexing suspended on this thread; dropping document delete");
            return false;
        }
        self.documents.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.documents.get(id).map(|doc| &doc.content)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Execute a compiled query, returning matching document ids in
    /// descending rank order. Unranked documents sort last; ties break on id
    /// so results stay deterministic.
    pub fn execute(&self, query: &SearchQuery) -> Vec<String> {
        let _timer = metrics::LatencyTimer::new("memory", "execute");

        let mut hits: Vec<(&String, Option<i64>)> = self
            .documents
            .iter()
            .filter(|(_, doc)| match query.expression() {
                None => true,
                Some(expr) => Self::matches(expr, &doc.content),
            })
            .map(|(id, doc)| (id, doc.rank))
            .collect();

        hits.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        metrics::record_memory_query(hits.len());

        hits.into_iter().map(|(id, _)| id.clone()).collect()
    }

    fn matches(expr: &SearchExpr, doc: &Value) -> bool {
        match expr {
            SearchExpr::And(nodes) => nodes.iter().all(|node| Self::matches(node, doc)),
            SearchExpr::Or(nodes) => nodes.iter().any(|node| Self::matches(node, doc)),
            SearchExpr::Comparison { field, op, value } => {
                Self::compare(doc.get(field), op, value)
            }
        }
    }

    fn compare(actual: Option<&Value>, op: &LookupOp, expected: &FilterValue) -> bool {
        let Some(actual) = actual else {
            // Only an explicit null equality can match an absent field.
            return matches!((op, expected), (LookupOp::Exact, FilterValue::Null));
        };

        match op {
            LookupOp::Exact => Self::value_eq(actual, expected),
            LookupOp::Gt => Self::value_cmp(actual, expected)
                .is_some_and(|ord| ord == std::cmp::Ordering::Greater),
            LookupOp::Gte => Self::value_cmp(actual, expected)
                .is_some_and(|ord| ord != std::cmp::Ordering::Less),
            LookupOp::Lt => Self::value_cmp(actual, expected)
                .is_some_and(|ord| ord == std::cmp::Ordering::Less),
            LookupOp::Lte => Self::value_cmp(actual, expected)
                .is_some_and(|ord| ord != std::cmp::Ordering::Greater),
            LookupOp::Contains => match (actual, expected) {
                (Value::String(s), FilterValue::Text(sub)) => s.contains(sub),
                _ => false,
            },
            LookupOp::StartsWith => match (actual, expected) {
                (Value::String(s), FilterValue::Text(prefix)) => s.starts_with(prefix),
                _ => false,
            },
            // Membership is lowered away before compilation; direct
            // expressions still get list semantics.
            LookupOp::In => match expected {
                FilterValue::List(candidates) => candidates
                    .iter()
                    .any(|candidate| Self::value_eq(actual, candidate)),
                _ => false,
            },
            LookupOp::Other(_) => false,
        }
    }

    fn value_eq(actual: &Value, expected: &FilterValue) -> bool {
        match (actual, expected) {
            (Value::Null, FilterValue::Null) => true,
            (Value::Bool(a), FilterValue::Bool(b)) => a == b,
            (Value::String(a), FilterValue::Text(b)) => a == b,
            (Value::Number(_), FilterValue::Integer(_) | FilterValue::Float(_)) => {
                match (Self::as_number(actual), Self::expected_number(expected)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn value_cmp(actual: &Value, expected: &FilterValue) -> Option<std::cmp::Ordering> {
        match (actual, expected) {
            (Value::String(a), FilterValue::Text(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => {
                let a = Self::as_number(actual)?;
                let b = Self::expected_number(expected)?;
                a.partial_cmp(&b)
            }
        }
    }

    fn as_number(value: &Value) -> Option<f64> {
        value.as_f64()
    }

    fn expected_number(value: &FilterValue) -> Option<f64> {
        match value {
            FilterValue::Integer(n) => Some(*n as f64),
            FilterValue::Float(x) => Some(*x),
            _ => None,
        }
    }
}
