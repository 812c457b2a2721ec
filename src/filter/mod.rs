// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Filter-tree translation
//!
//! Turns the ORM's boolean filter tree into the search backend's filter
//! expression, preserving AND/OR connector semantics.
//!
//! # Architecture
//!
//! ```text
//! FilterNode (ORM tree)
//!     ↓ extract (normalize, collapse single-child AND, lower leaves)
//! CanonicalFilter
//!     ↓ compile (explicit connector accumulator)
//! SearchQuery (backend query object)
//! ```
//!
//! Translation is a pure function of the input tree: no shared state, no
//! retries, all-or-nothing per call.

mod compile;
mod extract;
mod tree;

pub use compile::compile_filters;
pub use extract::{extract, lower_lookup, CanonicalFilter, CanonicalLeaf, CanonicalNode};
pub use tree::{Connector, FilterNode, FilterValue, Lookup, LookupOp};

use thiserror::Error;

/// A filter tree that cannot be translated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A connector string from the ORM layer is neither AND nor OR.
    #[error("unknown filter connector '{0}'")]
    InvalidConnector(String),
    /// A membership lookup was given something other than a non-empty list
    /// of scalar candidates.
    #[error("membership lookup on '{field}' requires a non-empty list of scalar candidates")]
    InvalidMembershipValue { field: String },
}
