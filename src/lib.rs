//! # Search Bridge
//!
//! Bridges an object-relational query layer to a document-search backend:
//! translates ORM filter trees into search queries, derives sortable numeric
//! ranks from model fields, and provides thread-scoped toggles to suspend
//! indexing during bulk operations.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORM filter tree                        │
//! │  FilterNode: Leaf(field, op, value) | Group(AND/OR, [...])  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                   (extract: collapse degenerate
//!                    AND groups, lower `in` lookups)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CanonicalFilter                        │
//! │  Normalized nested structure, input order preserved         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                   (compile: explicit connector
//!                    accumulator, never the builder's
//!                    implicit AND)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │               SearchQuery + SearchQueryAdapter              │
//! │  Backend filter expression, query-string rendering,         │
//! │  source queryset kept for introspection                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use search_bridge::{
//!     FilterNode, MemoryIndex, ModelMeta, SearchQueryAdapter, SourceQuery, gate,
//! };
//! use serde_json::json;
//!
//! // given_name='pete' AND (email='1@thing.com' OR email='2@thing.com')
//! let tree = FilterNode::exact("given_name", "pete").and(
//!     FilterNode::exact("email", "1@thing.com").or(FilterNode::exact("email", "2@thing.com")),
//! );
//!
//! let source = SourceQuery::new(ModelMeta::new("people", "profile"), tree);
//! let adapter = SearchQueryAdapter::adapt(source).unwrap();
//! assert_eq!(adapter.query().index(), "people_profile");
//!
//! // Run it against the in-memory reference index.
//! gate::enable();
//! let mut index = MemoryIndex::new();
//! index.put(
//!     "p1",
//!     json!({"given_name": "pete", "email": "1@thing.com"}),
//!     None,
//! );
//! assert_eq!(index.execute(adapter.query()), vec!["p1"]);
//! ```
//!
//! ## Modules
//!
//! - [`filter`]: filter-tree extraction, lookup lowering, compilation
//! - [`query`]: backend query objects, rendering, queryset adapter
//! - [`rank`]: document rank encoding and resolution
//! - [`gate`]: thread-scoped indexing toggles
//! - [`index`]: index metadata, dispatch identifiers, registry
//! - [`memory`]: in-memory reference index
//! - [`config`]: process-wide configuration
//!
//! Translation is synchronous and pure; the only mutable state in the crate
//! is the indexing gate (thread-scoped by design) and the process-wide
//! configuration defaults.

pub mod config;
pub mod filter;
pub mod gate;
pub mod index;
pub mod memory;
pub mod metrics;
pub mod query;
pub mod rank;

pub use config::SearchBridgeConfig;
pub use filter::{
    compile_filters, extract, lower_lookup, CanonicalFilter, CanonicalLeaf, CanonicalNode,
    Connector, FilterError, FilterNode, FilterValue, Lookup, LookupOp,
};
pub use gate::{DisablingScope, EnablingScope, ScopedGate};
pub use index::{get_uid, IndexRegistry, ModelMeta, SearchIndex};
pub use memory::MemoryIndex;
pub use query::{Accumulator, QueryStringRenderer, SearchExpr, SearchQuery, SearchQueryAdapter, SourceQuery};
pub use rank::{
    encode_string_rank, resolve_rank, RankAccess, RankError, RankSpec, RankValue, MAX_RANK,
};
