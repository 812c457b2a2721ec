//! Queryset adaptation.
//!
//! The top-level entry point: takes the slice of an ORM queryset the bridge
//! consumes and produces the equivalent compiled search query, wrapped in an
//! adapter that keeps the source around for introspection.

use tracing::debug;

use crate::filter::{compile_filters, extract, FilterError, FilterNode};
use crate::index::ModelMeta;
use crate::metrics;

use super::expr::SearchQuery;

/// What the ORM layer hands over: the model a queryset targets and the
/// filter tree accumulated on it. An unfiltered queryset carries no tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceQuery {
    pub model: ModelMeta,
    pub filter: Option<FilterNode>,
}

impl SourceQuery {
    pub fn new(model: ModelMeta, filter: impl Into<Option<FilterNode>>) -> Self {
        Self {
            model,
            filter: filter.into(),
        }
    }
}

/// A compiled search query together with the queryset it came from.
///
/// The adapter owns the compiled query; the source is held only for
/// introspection, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQueryAdapter {
    query: SearchQuery,
    source: SourceQuery,
}

impl SearchQueryAdapter {
    /// Translate an ORM queryset into an equivalent search query.
    ///
    /// The query targets the model's default index; the source filter tree
    /// is extracted and compiled with its connector semantics intact.
    pub fn adapt(source: SourceQuery) -> Result<Self, FilterError> {
        let _timer = metrics::LatencyTimer::new("filter", "translate");

        match Self::translate(&source) {
            Ok(query) => {
                metrics::record_translation("success");
                debug!(
                    index = %query.index(),
                    filtered = source.filter.is_some(),
                    "translated queryset to search query"
                );
                Ok(Self { query, source })
            }
            Err(err) => {
                metrics::record_translation("error");
                Err(err)
            }
        }
    }

    fn translate(source: &SourceQuery) -> Result<SearchQuery, FilterError> {
        let mut query = SearchQuery::new(source.model.default_index_name());
        if let Some(tree) = &source.filter {
            let canonical = extract(tree)?;
            query = compile_filters(&canonical, query)?;
        }
        Ok(query)
    }

    /// The compiled backend query.
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// The originating queryset slice.
    pub fn source(&self) -> &SourceQuery {
        &self.source
    }

    /// Give up the adapter, keeping only the compiled query.
    pub fn into_query(self) -> SearchQuery {
        self.query
    }
}
