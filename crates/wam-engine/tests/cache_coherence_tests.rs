//! Cache behavior: idempotence, scoped invalidation, and generation
//! tracking across every writer the engine exposes.

use wam_engine::{
    GlobalPolicy, LicenseProfile, NodeData, PolicyEngine, PolicyTree,
};
use wam_types::{FacetDecl, InputTokens, NodeId, OutputTokens};

/// Two siblings with a child each:
///
/// ```text
/// root
/// ├── left ── left_leaf
/// └── right ── right_leaf
/// ```
fn two_branch_engine() -> (PolicyEngine, NodeId, NodeId, NodeId, NodeId) {
    let mut tree = PolicyTree::new(NodeData::new());
    let left = tree
        .add_child(tree.root(), NodeData::new().with_input_tokens(&["text"]))
        .expect("add");
    let left_leaf = tree.add_child(left, NodeData::new()).expect("add");
    let right = tree
        .add_child(tree.root(), NodeData::new().with_input_tokens(&["media"]))
        .expect("add");
    let right_leaf = tree.add_child(right, NodeData::new()).expect("add");
    (PolicyEngine::new(tree), left, left_leaf, right, right_leaf)
}

#[test]
fn second_query_is_a_cache_hit_with_identical_result() {
    let (engine, _, left_leaf, ..) = two_branch_engine();

    let first = engine.get_effective(left_leaf);
    let stats = engine.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);

    let second = engine.get_effective(left_leaf);
    let stats = engine.cache_stats();
    assert_eq!(stats.misses, 1, "no recomputation on the second query");
    assert_eq!(stats.hits, 1);

    // bit-identical: the very same snapshot is served
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);
}

#[test]
fn mutating_one_branch_leaves_cousins_cached() {
    let (mut engine, left, left_leaf, _right, right_leaf) = two_branch_engine();

    engine.get_effective(left_leaf);
    engine.get_effective(right_leaf);
    assert_eq!(engine.cache_stats().misses, 2);

    engine
        .tree_mut()
        .set_input_declaration(left, FacetDecl::Explicit(InputTokens::MEDIA))
        .expect("known node");

    // the cousin's entry is still valid — no shared ancestry changed
    engine.get_effective(right_leaf);
    assert_eq!(engine.cache_stats().hits, 1);
    assert_eq!(engine.cache_stats().misses, 2);

    // the mutated branch recomputes and reflects the change
    let policy = engine.get_effective(left_leaf);
    assert_eq!(policy.input, InputTokens::MEDIA);
    assert_eq!(engine.cache_stats().misses, 3);
}

#[test]
fn descendants_see_ancestor_mutations() {
    let (mut engine, left, left_leaf, ..) = two_branch_engine();

    assert_eq!(engine.get_effective(left_leaf).input, InputTokens::TEXT);

    engine
        .tree_mut()
        .declare_input(left, &["structure"])
        .expect("known node");

    assert_eq!(engine.get_effective(left_leaf).input, InputTokens::STRUCTURE);
}

#[test]
fn replacing_the_global_policy_invalidates_everything() {
    let (mut engine, _, left_leaf, _, right_leaf) = two_branch_engine();
    engine.get_effective(left_leaf);
    engine.get_effective(right_leaf);

    let global: GlobalPolicy = serde_json::from_str(
        r#"{ "defaults": { "output": ["readonly", "annotation"] } }"#,
    )
    .expect("valid policy");
    engine.replace_global(global);

    let misses_before = engine.cache_stats().misses;
    let policy = engine.get_effective(left_leaf);
    assert_eq!(
        policy.output,
        OutputTokens::READONLY | OutputTokens::ANNOTATION
    );
    assert_eq!(engine.cache_stats().misses, misses_before + 1);
}

#[test]
fn license_reload_invalidates_cached_resolutions() {
    let mut tree = PolicyTree::new(NodeData::new());
    let node = tree
        .add_child(tree.root(), NodeData::new().with_license("CUSTOM-1.0"))
        .expect("add");
    let mut engine = PolicyEngine::new(tree);

    // unknown at first: most restrictive fallback
    let policy = engine.get_effective(node);
    assert!(policy.license.as_ref().expect("facts").fallback);

    engine
        .reload_licenses(
            vec![(
                "CUSTOM-1.0".to_string(),
                LicenseProfile::permissive("Custom License", false, false, false),
            )],
            Vec::<(String, String)>::new(),
        )
        .expect("valid reload");

    let policy = engine.get_effective(node);
    let facts = policy.license.as_ref().expect("facts");
    assert!(!facts.fallback);
    assert_eq!(facts.license_id, "CUSTOM-1.0");
    assert!(policy.output.contains(OutputTokens::MUTABLE));
}

#[test]
fn failed_reload_preserves_cache_validity() {
    let (mut engine, _, left_leaf, ..) = two_branch_engine();
    engine.get_effective(left_leaf);

    let err = engine.reload_licenses(
        vec![(
            "ONLY".to_string(),
            LicenseProfile::most_restrictive(),
        )],
        vec![("X".to_string(), "missing".to_string())],
    );
    assert!(err.is_err());

    // rejected reload did not move the registry generation
    engine.get_effective(left_leaf);
    assert_eq!(engine.cache_stats().hits, 1);
}

#[test]
fn structural_edits_invalidate_the_moved_subtree() {
    let (mut engine, left, left_leaf, right, _) = two_branch_engine();
    assert_eq!(engine.get_effective(left_leaf).input, InputTokens::TEXT);

    // move left_leaf under `right`
    engine.tree_mut().detach(left_leaf).expect("detach");
    engine.tree_mut().attach(right, left_leaf).expect("attach");

    // ancestry changed: the leaf now inherits from `right`
    assert_eq!(engine.get_effective(left_leaf).input, InputTokens::MEDIA);

    // moving back restores the old resolution
    engine.tree_mut().detach(left_leaf).expect("detach");
    engine.tree_mut().attach(left, left_leaf).expect("attach");
    assert_eq!(engine.get_effective(left_leaf).input, InputTokens::TEXT);
}

#[test]
fn detached_subtree_resolves_against_its_own_top() {
    let (mut engine, left, left_leaf, ..) = two_branch_engine();
    engine.tree_mut().detach(left).expect("detach");

    // the detached branch no longer sees the document root; its top node
    // has the nearest declaration
    let policy = engine.get_effective(left_leaf);
    assert_eq!(policy.input, InputTokens::TEXT);
}

#[test]
fn concurrent_readers_share_the_cache() {
    let (engine, _, left_leaf, _, right_leaf) = two_branch_engine();
    let engine = std::sync::Arc::new(engine);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = std::sync::Arc::clone(&engine);
            let node = if i % 2 == 0 { left_leaf } else { right_leaf };
            std::thread::spawn(move || engine.get_effective(node))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("reader thread"))
        .collect();

    // all readers of the same node agree
    assert_eq!(results[0], results[2]);
    assert_eq!(results[1], results[3]);
    // at most one recompute per node happened... and at least one each
    let stats = engine.cache_stats();
    assert_eq!(stats.hits + stats.misses, 4);
    assert!(stats.misses >= 2);
}
