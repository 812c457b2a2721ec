//! Index metadata and registration.
//!
//! Ties a model to its search index: default index naming, the dispatch
//! identifier used to key signal-handler registration, and a concurrent
//! registry of live index definitions.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics;
use crate::rank::{resolve_rank, RankAccess, RankError, RankSpec};

/// The model introspection the bridge needs: where a model lives and what
/// it is called.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelMeta {
    pub app_label: String,
    pub model_name: String,
}

impl ModelMeta {
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into(),
        }
    }

    /// The default search index name for the model.
    pub fn default_index_name(&self) -> String {
        format!("{}_{}", self.app_label, self.model_name)
    }
}

/// The dispatch identifier for a model, document and index combination.
///
/// Used as the unique key when connecting signal handlers; distinct triples
/// produce distinct identifiers, and the same triple always produces the
/// same identifier, across calls and across process restarts.
pub fn get_uid(index_name: &str, model_class: &str, document_class: &str) -> String {
    format!("{index_name}.{model_class}.{document_class}")
}

/// A search index definition: which model feeds it, the document class that
/// renders instances, and how documents are ranked.
#[derive(Debug)]
pub struct SearchIndex {
    pub name: String,
    pub model: ModelMeta,
    pub document_class: String,
    pub rank: Option<RankSpec>,
}

impl SearchIndex {
    /// An index for `model` under its default index name.
    pub fn new(model: ModelMeta, document_class: impl Into<String>) -> Self {
        Self {
            name: model.default_index_name(),
            model,
            document_class: document_class.into(),
            rank: None,
        }
    }

    /// Override the index name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Rank documents with the given spec.
    pub fn ranked_by(mut self, rank: RankSpec) -> Self {
        self.rank = Some(rank);
        self
    }

    /// This index's dispatch identifier.
    pub fn uid(&self) -> String {
        get_uid(&self.name, &self.model.model_name, &self.document_class)
    }

    /// The rank for one instance's document under this index's rank spec.
    pub fn rank_for<A: RankAccess>(&self, instance: &A) -> Result<Option<i64>, RankError> {
        resolve_rank(instance, self.rank.as_ref())
    }
}

/// Concurrent registry of index definitions, keyed by dispatch identifier.
///
/// Registration is idempotent per identifier, mirroring how signal
/// connections deduplicate on their dispatch key.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    entries: DashMap<String, SearchIndex>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an index; returns its dispatch identifier. An existing
    /// registration under the same identifier is left in place.
    pub fn register(&self, index: SearchIndex) -> String {
        let uid = index.uid();
        self.entries.entry(uid.clone()).or_insert(index);
        metrics::set_registered_indexes(self.entries.len());
        info!(uid = %uid, "search index registered");
        uid
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.entries.contains_key(uid)
    }

    /// Remove a registration; returns whether one existed.
    pub fn unregister(&self, uid: &str) -> bool {
        let removed = self.entries.remove(uid).is_some();
        metrics::set_registered_indexes(self.entries.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run `f` against the registered index, when present.
    pub fn with_index<T>(&self, uid: &str, f: impl FnOnce(&SearchIndex) -> T) -> Option<T> {
        self.entries.get(uid).map(|entry| f(entry.value()))
    }
}
