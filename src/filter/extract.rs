//! Filter-tree extraction.
//!
//! Walks the ORM filter tree and normalizes it into the canonical nested
//! structure handed to the compiler. Two normalizations happen on the way:
//!
//! - A child group with connector AND and exactly one child is collapsed to
//!   that child. Such degenerate groups appear when independently built
//!   queries are combined.
//! - Membership lookups (`in`) are lowered to an OR group of equality
//!   lookups, since the backend has no native membership comparison.
//!
//! Child order in the output mirrors the input exactly; the backend is
//! order-insensitive per connector, but determinism keeps translations
//! testable.

use super::tree::{Connector, FilterNode, FilterValue, Lookup, LookupOp};
use super::FilterError;

/// The normalized intermediate form of a filter tree: the hand-off point
/// between extraction and compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalFilter {
    pub connector: Connector,
    pub children: Vec<CanonicalNode>,
}

/// One canonical child: a lowered leaf or a nested group.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalNode {
    Leaf(CanonicalLeaf),
    Group(CanonicalFilter),
}

/// A lowered leaf comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalLeaf {
    pub field: String,
    pub op: LookupOp,
    pub value: FilterValue,
}

/// Normalize an ORM filter tree into its canonical form.
///
/// A bare leaf at the root is treated as a single-condition AND group.
pub fn extract(root: &FilterNode) -> Result<CanonicalFilter, FilterError> {
    match root {
        FilterNode::Leaf(lookup) => Ok(CanonicalFilter {
            connector: Connector::And,
            children: vec![lower_lookup(lookup)?],
        }),
        FilterNode::Group { connector, children } => extract_group(*connector, children),
    }
}

fn extract_group(
    connector: Connector,
    children: &[FilterNode],
) -> Result<CanonicalFilter, FilterError> {
    let mut out = Vec::with_capacity(children.len());

    for child in children {
        let child = collapse(child);
        match child {
            FilterNode::Leaf(lookup) => out.push(lower_lookup(lookup)?),
            FilterNode::Group { connector, children } => {
                out.push(CanonicalNode::Group(extract_group(*connector, children)?));
            }
        }
    }

    Ok(CanonicalFilter {
        connector,
        children: out,
    })
}

/// An AND group with a single child stands in for that child.
fn collapse(node: &FilterNode) -> &FilterNode {
    match node {
        FilterNode::Group {
            connector: Connector::And,
            children,
        } if children.len() == 1 => &children[0],
        _ => node,
    }
}

/// Lower a single lookup into canonical form.
///
/// The membership operator expands into an OR group of equality leaves, one
/// per candidate; every other operator passes through unchanged. Membership
/// with anything but a non-empty list of scalars is an invalid filter
/// (groups must never be empty).
pub fn lower_lookup(lookup: &Lookup) -> Result<CanonicalNode, FilterError> {
    if lookup.op.is_membership() {
        let FilterValue::List(candidates) = &lookup.value else {
            return Err(FilterError::InvalidMembershipValue {
                field: lookup.field.clone(),
            });
        };
        if candidates.is_empty() || candidates.iter().any(|v| !v.is_scalar()) {
            return Err(FilterError::InvalidMembershipValue {
                field: lookup.field.clone(),
            });
        }

        let children = candidates
            .iter()
            .map(|candidate| {
                CanonicalNode::Leaf(CanonicalLeaf {
                    field: lookup.field.clone(),
                    op: LookupOp::Exact,
                    value: candidate.clone(),
                })
            })
            .collect();

        return Ok(CanonicalNode::Group(CanonicalFilter {
            connector: Connector::Or,
            children,
        }));
    }

    Ok(CanonicalNode::Leaf(CanonicalLeaf {
        field: lookup.field.clone(),
        op: lookup.op.clone(),
        value: lookup.value.clone(),
    }))
}
