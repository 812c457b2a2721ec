//! End-to-end translation tests.
//!
//! Each round trip builds an ORM-style filter tree, translates it through
//! extract → compile → adapter, executes the compiled query against the
//! in-memory reference index, and compares the matched-record set to an
//! independent boolean evaluation of the source tree.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use search_bridge::{
    extract, gate, Connector, FilterNode, FilterValue, Lookup, LookupOp, MemoryIndex, ModelMeta,
    RankSpec, SearchIndex, SearchQueryAdapter, SourceQuery,
};

fn profile() -> ModelMeta {
    ModelMeta::new("people", "profile")
}

fn fixture_docs() -> Vec<(&'static str, Value)> {
    vec![
        ("p1", json!({"a": 1, "b": 2, "given_name": "pete", "email": "1@thing.com"})),
        ("p2", json!({"a": 1, "b": 3, "given_name": "pete", "email": "2@thing.com"})),
        ("p3", json!({"a": 1, "b": 4, "given_name": "ada", "email": "3@thing.com"})),
        ("p4", json!({"a": 2, "b": 2, "given_name": "ada", "email": "4@thing.com"})),
        ("p5", json!({"a": 2, "b": 3, "given_name": "iris", "email": "1@thing.com"})),
    ]
}

fn loaded_index() -> MemoryIndex {
    gate::enable();
    let mut index = MemoryIndex::new();
    for (id, doc) in fixture_docs() {
        index.put(id, doc, None);
    }
    index
}

/// Independent reference evaluation of the source tree, used as the oracle
/// for round-trip comparisons.
fn reference_eval(node: &FilterNode, doc: &Value) -> bool {
    match node {
        FilterNode::Group {
            connector: Connector::And,
            children,
        } => children.iter().all(|child| reference_eval(child, doc)),
        FilterNode::Group {
            connector: Connector::Or,
            children,
        } => children.iter().any(|child| reference_eval(child, doc)),
        FilterNode::Leaf(lookup) => reference_eval_lookup(lookup, doc),
    }
}

fn reference_eval_lookup(lookup: &Lookup, doc: &Value) -> bool {
    let actual = doc.get(&lookup.field);
    match (&lookup.op, &lookup.value) {
        (LookupOp::Exact, FilterValue::Text(t)) => actual.and_then(Value::as_str) == Some(t),
        (LookupOp::Exact, FilterValue::Integer(n)) => actual.and_then(Value::as_i64) == Some(*n),
        (LookupOp::Gt, FilterValue::Integer(n)) => {
            actual.and_then(Value::as_i64).is_some_and(|v| v > *n)
        }
        (LookupOp::Lt, FilterValue::Integer(n)) => {
            actual.and_then(Value::as_i64).is_some_and(|v| v < *n)
        }
        (LookupOp::In, FilterValue::List(candidates)) => candidates.iter().any(|candidate| {
            reference_eval_lookup(
                &Lookup::new(lookup.field.clone(), LookupOp::Exact, candidate.clone()),
                doc,
            )
        }),
        _ => false,
    }
}

fn matched_set(tree: &FilterNode) -> BTreeSet<String> {
    let index = loaded_index();
    let adapter = SearchQueryAdapter::adapt(SourceQuery::new(profile(), tree.clone())).unwrap();
    index.execute(adapter.query()).into_iter().collect()
}

fn reference_set(tree: &FilterNode) -> BTreeSet<String> {
    fixture_docs()
        .into_iter()
        .filter(|(_, doc)| reference_eval(tree, doc))
        .map(|(id, _)| id.to_string())
        .collect()
}

#[test]
fn test_round_trip_and_with_nested_or() {
    // a=1 AND (b=2 OR b=3)
    let tree = FilterNode::exact("a", 1i64)
        .and(FilterNode::exact("b", 2i64).or(FilterNode::exact("b", 3i64)));

    let matched = matched_set(&tree);
    assert_eq!(matched, reference_set(&tree));
    assert_eq!(
        matched,
        BTreeSet::from(["p1".to_string(), "p2".to_string()])
    );
}

#[test]
fn test_round_trip_or_of_ands() {
    // (a=1 AND b=2) OR (a=2 AND b=3)
    let tree = (FilterNode::exact("a", 1i64).and(FilterNode::exact("b", 2i64)))
        .or(FilterNode::exact("a", 2i64).and(FilterNode::exact("b", 3i64)));

    let matched = matched_set(&tree);
    assert_eq!(matched, reference_set(&tree));
    assert_eq!(
        matched,
        BTreeSet::from(["p1".to_string(), "p5".to_string()])
    );
}

#[test]
fn test_round_trip_membership() {
    let tree = FilterNode::leaf("email", LookupOp::In, vec!["1@thing.com", "2@thing.com"]);

    let matched = matched_set(&tree);
    assert_eq!(matched, reference_set(&tree));
    assert_eq!(
        matched,
        BTreeSet::from(["p1".to_string(), "p2".to_string(), "p5".to_string()])
    );
}

#[test]
fn test_round_trip_combined_querysets_collapse() {
    // Combining independently built queries wraps each side in a
    // single-child AND group; the translation must see through it.
    let wrapped = FilterNode::group(
        Connector::And,
        vec![FilterNode::group(
            Connector::And,
            vec![FilterNode::exact("given_name", "pete")],
        )],
    );
    let direct = FilterNode::group(
        Connector::And,
        vec![FilterNode::exact("given_name", "pete")],
    );

    assert_eq!(extract(&wrapped).unwrap(), extract(&direct).unwrap());
    assert_eq!(matched_set(&wrapped), matched_set(&direct));
}

#[test]
fn test_external_tree_shape_deserializes_and_translates() {
    // The wire shape the ORM layer hands over.
    let raw = json!({
        "connector": "AND",
        "children": [
            {"field": "given_name", "op": "exact", "value": "pete"},
            {
                "connector": "OR",
                "children": [
                    {"field": "email", "op": "exact", "value": "1@thing.com"},
                    {"field": "email", "op": "exact", "value": "2@thing.com"},
                ],
            },
        ],
    });
    let tree: FilterNode = serde_json::from_value(raw).unwrap();

    let matched = matched_set(&tree);
    assert_eq!(matched, reference_set(&tree));
    assert_eq!(
        matched,
        BTreeSet::from(["p1".to_string(), "p2".to_string()])
    );
}

#[test]
fn test_query_string_round_trip() {
    let tree = FilterNode::exact("given_name", "pete")
        .and(FilterNode::exact("b", 2i64).or(FilterNode::exact("b", 3i64)));
    let adapter = SearchQueryAdapter::adapt(SourceQuery::new(profile(), tree)).unwrap();

    assert_eq!(
        adapter.query().to_query_string(),
        "(@given_name:pete (@b:[2 2] | @b:[3 3]))"
    );
}

#[test]
fn test_ranked_index_orders_results() {
    gate::enable();

    let search_index = SearchIndex::new(profile(), "ProfileDocument")
        .ranked_by(RankSpec::field("given_name"));

    let mut index = MemoryIndex::new();
    for (id, doc) in fixture_docs() {
        let rank = search_index.rank_for(&doc).unwrap();
        index.put(id, doc, rank);
    }

    let adapter = SearchQueryAdapter::adapt(SourceQuery::new(profile(), None)).unwrap();
    // Backend default order is rank descending: names sort reverse-
    // alphabetically, ids break the ties.
    assert_eq!(
        index.execute(adapter.query()),
        vec!["p1", "p2", "p5", "p3", "p4"]
    );
}

#[test]
fn test_bulk_operation_suspends_indexing() {
    gate::enable();
    let mut index = MemoryIndex::new();

    {
        let _guard = gate::suspended();
        for (id, doc) in fixture_docs() {
            index.put(id, doc, None);
        }
    }
    // Nothing was indexed while the gate was held.
    assert!(index.is_empty());

    for (id, doc) in fixture_docs() {
        index.put(id, doc, None);
    }
    assert_eq!(index.len(), fixture_docs().len());
}
