//! Property tests for the resolution algebra: every layer narrows, sticky
//! `none` holds, and license ceilings are never exceeded.

use proptest::prelude::*;
use wam_engine::{
    GlobalPolicy, LicenseRegistry, NodeData, PolicyEngine, PolicyTree,
};
use wam_types::{FacetDecl, InputTokens, NodeId, OutputTokens};

/// An arbitrary (possibly empty) output declaration.
fn output_decl() -> impl Strategy<Value = FacetDecl<OutputTokens>> {
    prop_oneof![
        Just(FacetDecl::Inherit),
        any::<u16>().prop_map(|bits| {
            let set = OutputTokens::from_bits_truncate(bits);
            if set.is_empty() {
                FacetDecl::Inherit
            } else {
                FacetDecl::Explicit(set)
            }
        }),
    ]
}

/// An arbitrary input declaration, `none` included.
fn input_decl() -> impl Strategy<Value = FacetDecl<InputTokens>> {
    prop_oneof![
        Just(FacetDecl::Inherit),
        Just(FacetDecl::ExplicitNone),
        any::<u8>().prop_map(|bits| {
            let set = InputTokens::from_bits_truncate(bits);
            if set.is_empty() {
                FacetDecl::ExplicitNone
            } else {
                FacetDecl::Explicit(set)
            }
        }),
    ]
}

/// A root-to-leaf chain of output declarations; returns the engine-free
/// tree plus the leaf id.
fn chain_tree(decls: &[FacetDecl<OutputTokens>]) -> (PolicyTree, NodeId) {
    let mut iter = decls.iter();
    let root_decl = iter.next().copied().unwrap_or(FacetDecl::Inherit);
    let mut tree = PolicyTree::new(NodeData::new().with_output(root_decl));
    let mut node = tree.root();
    for &decl in iter {
        node = tree
            .add_child(node, NodeData::new().with_output(decl))
            .expect("chain grows");
    }
    (tree, node)
}

fn builtin_license_ids() -> Vec<&'static str> {
    vec![
        "CC0-1.0",
        "MIT",
        "Apache-2.0",
        "CC-BY-4.0",
        "CC-BY-SA-4.0",
        "CC-BY-ND-4.0",
        "CC-BY-NC-ND-4.0",
        "GPL-3.0-only",
        "MPL-2.0",
        "proprietary",
        "all-rights-reserved",
    ]
}

proptest! {
    /// `final_output ⊆ ceiling` for every builtin license, whatever the
    /// chain of declarations above the node says.
    #[test]
    fn license_ceiling_is_never_exceeded(
        decls in prop::collection::vec(output_decl(), 1..6),
        license_idx in 0usize..11,
    ) {
        let license = builtin_license_ids()[license_idx];
        let (mut tree, leaf) = chain_tree(&decls);
        tree.set_license(leaf, Some(license.to_string())).expect("known node");

        let registry = LicenseRegistry::builtin();
        let (_, profile) = registry.resolve(license).expect("builtin license");
        let ceiling = profile.allowed_output_tokens.normalized();

        let engine = PolicyEngine::new(tree);
        let policy = engine.get_effective(leaf);
        prop_assert!(ceiling.contains(policy.output));
    }

    /// Adding a license can only narrow the licenseless resolution.
    #[test]
    fn license_layer_only_narrows(
        decls in prop::collection::vec(output_decl(), 1..6),
        license_idx in 0usize..11,
    ) {
        let license = builtin_license_ids()[license_idx];

        let (tree, leaf) = chain_tree(&decls);
        let unlicensed = PolicyEngine::new(tree).get_effective(leaf).output;

        let (mut tree, leaf) = chain_tree(&decls);
        tree.set_license(leaf, Some(license.to_string())).expect("known node");
        let licensed = PolicyEngine::new(tree).get_effective(leaf).output;

        prop_assert!(unlicensed.contains(licensed));
    }

    /// A category rule can only narrow the unconstrained resolution.
    #[test]
    fn category_layer_only_narrows(
        decls in prop::collection::vec(output_decl(), 1..6),
        override_bits in any::<u16>(),
    ) {
        let (tree, leaf) = chain_tree(&decls);
        let unconstrained = PolicyEngine::new(tree).get_effective(leaf).output;

        let override_set = OutputTokens::from_bits_truncate(override_bits);
        let global: GlobalPolicy = serde_json::from_value(serde_json::json!({
            "constraints": {
                "category-rules": {
                    "probe": { "output": override_set.names() }
                }
            }
        })).expect("valid policy");

        let (mut tree, leaf) = chain_tree(&decls);
        tree.set_category(leaf, Some("probe".to_string())).expect("known node");
        let constrained = PolicyEngine::new(tree)
            .with_global(global)
            .get_effective(leaf)
            .output;

        prop_assert!(unconstrained.contains(constrained));
    }

    /// If an ancestor declares input `none` and nothing below it declares,
    /// the whole subtree resolves to `none`.
    #[test]
    fn sticky_none_over_arbitrary_prefixes(
        prefix in prop::collection::vec(input_decl(), 0..4),
        tail_len in 0usize..4,
    ) {
        let mut iter = prefix.iter();
        let root_decl = iter.next().copied().unwrap_or(FacetDecl::Inherit);
        let mut tree = PolicyTree::new(NodeData::new().with_input(root_decl));
        let mut node = tree.root();
        for &decl in iter {
            node = tree
                .add_child(node, NodeData::new().with_input(decl))
                .expect("chain grows");
        }
        // the `none` declaration, then an undeclared tail
        node = tree
            .add_child(node, NodeData::new().with_input(FacetDecl::ExplicitNone))
            .expect("chain grows");
        for _ in 0..tail_len {
            node = tree
                .add_child(node, NodeData::new())
                .expect("chain grows");
        }

        let engine = PolicyEngine::new(tree);
        prop_assert_eq!(engine.get_effective(node).input, InputTokens::empty());
    }

    /// Idempotence: querying twice with no intervening writes yields equal
    /// snapshots and the second query does not recompute.
    #[test]
    fn repeated_queries_are_idempotent(
        decls in prop::collection::vec(output_decl(), 1..5),
    ) {
        let (tree, leaf) = chain_tree(&decls);
        let engine = PolicyEngine::new(tree);

        let first = engine.get_effective(leaf);
        let second = engine.get_effective(leaf);
        prop_assert_eq!(&*first, &*second);
        prop_assert_eq!(engine.cache_stats().misses, 1);
        prop_assert_eq!(engine.cache_stats().hits, 1);
    }
}
