//! Filter-tree compilation.
//!
//! Walks the canonical structure and folds it into a backend query. The crux
//! is connector handling: the backend's query builder would AND every added
//! condition, so each group manages its own [`Accumulator`] and applies the
//! group's connector explicitly when folding leaves and sub-groups.

use crate::query::{Accumulator, SearchExpr, SearchQuery};

use super::extract::{CanonicalFilter, CanonicalNode};
use super::FilterError;

/// Compile a canonical filter into `query`'s condition set.
///
/// Leaves become comparison expressions folded under the group's own
/// connector; a nested group compiles to a sub-expression first and is then
/// folded into its parent's accumulator the same way. The finished
/// expression is merged into the query with the root group's connector.
///
/// All-or-nothing: an invalid filter leaves no partial conditions on the
/// query.
pub fn compile_filters(
    filters: &CanonicalFilter,
    mut query: SearchQuery,
) -> Result<SearchQuery, FilterError> {
    if let Some(expr) = compile_group(filters)? {
        query.apply(filters.connector, expr);
    }
    Ok(query)
}

fn compile_group(filters: &CanonicalFilter) -> Result<Option<SearchExpr>, FilterError> {
    let connector = filters.connector;
    let mut gathered = Accumulator::new();

    for child in &filters.children {
        match child {
            CanonicalNode::Leaf(leaf) => {
                gathered.apply(connector, SearchExpr::comparison(leaf));
            }
            CanonicalNode::Group(sub) => {
                if let Some(sub_expr) = compile_group(sub)? {
                    gathered.apply(connector, sub_expr);
                }
            }
        }
    }

    Ok(gathered.into_expression())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{extract, Connector, FilterNode, FilterValue, LookupOp};

    fn cmp(field: &str, value: impl Into<FilterValue>) -> SearchExpr {
        SearchExpr::Comparison {
            field: field.into(),
            op: LookupOp::Exact,
            value: value.into(),
        }
    }

    fn compile_tree(tree: &FilterNode) -> SearchQuery {
        let canonical = extract(tree).unwrap();
        compile_filters(&canonical, SearchQuery::new("people_profile")).unwrap()
    }

    #[test]
    fn test_leaves_fold_under_the_group_connector() {
        // The naive builder default would AND these; the OR group must win.
        let tree = FilterNode::exact("email", "x").or(FilterNode::exact("email", "y"));
        let query = compile_tree(&tree);

        assert_eq!(
            query.expression(),
            Some(&SearchExpr::Or(vec![cmp("email", "x"), cmp("email", "y")]))
        );
    }

    #[test]
    fn test_nested_group_folds_into_parent() {
        // a=1 AND (b=2 OR b=3)
        let tree = FilterNode::exact("a", 1i64)
            .and(FilterNode::exact("b", 2i64).or(FilterNode::exact("b", 3i64)));
        let query = compile_tree(&tree);

        assert_eq!(
            query.expression(),
            Some(&SearchExpr::And(vec![
                cmp("a", 1i64),
                SearchExpr::Or(vec![cmp("b", 2i64), cmp("b", 3i64)]),
            ]))
        );
    }

    #[test]
    fn test_sibling_or_groups_stay_anded() {
        // (a=1 OR a=2) AND (b=3 OR b=4)
        let tree = FilterNode::group(
            Connector::And,
            vec![
                FilterNode::exact("a", 1i64).or(FilterNode::exact("a", 2i64)),
                FilterNode::exact("b", 3i64).or(FilterNode::exact("b", 4i64)),
            ],
        );
        let query = compile_tree(&tree);

        assert_eq!(
            query.expression(),
            Some(&SearchExpr::And(vec![
                SearchExpr::Or(vec![cmp("a", 1i64), cmp("a", 2i64)]),
                SearchExpr::Or(vec![cmp("b", 3i64), cmp("b", 4i64)]),
            ]))
        );
    }

    #[test]
    fn test_membership_compiles_to_or_of_equalities() {
        let tree = FilterNode::leaf("email", LookupOp::In, vec!["x", "y"]);
        let query = compile_tree(&tree);

        assert_eq!(
            query.expression(),
            Some(&SearchExpr::Or(vec![cmp("email", "x"), cmp("email", "y")]))
        );
    }

    #[test]
    fn test_empty_group_leaves_query_unfiltered() {
        let canonical = CanonicalFilter {
            connector: Connector::And,
            children: vec![],
        };
        let query = compile_filters(&canonical, SearchQuery::new("idx")).unwrap();
        assert!(query.expression().is_none());
    }

    #[test]
    fn test_compilation_preserves_child_order() {
        let tree = FilterNode::group(
            Connector::And,
            vec![
                FilterNode::exact("a", 1i64),
                FilterNode::exact("b", 2i64),
                FilterNode::exact("c", 3i64),
            ],
        );
        let query = compile_tree(&tree);

        assert_eq!(
            query.expression(),
            Some(&SearchExpr::And(vec![
                cmp("a", 1i64),
                cmp("b", 2i64),
                cmp("c", 3i64),
            ]))
        );
    }
}
