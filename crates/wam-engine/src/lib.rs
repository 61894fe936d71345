//! Effective-permission resolution engine for agent-facing markup policies.
//!
//! Resolves, for every node in a markup document, the effective set of
//! permissions an automated content-consuming agent holds over that node:
//! what it may read (input), what it may do with the content (output), and
//! what it may retain (memory). Permissions are declared locally on nodes,
//! inherited down the tree, constrained by a document-wide policy, capped by
//! the content license, and cross-checked by structural dependency rules.
//!
//! # Resolution Pipeline
//!
//! ```text
//! PolicyTree ──► Cascade ──► Constraints ──► License ──► EffectivePolicy
//!  (declared)   (inherit)   (block/category)  (ceiling)     (cached)
//!                   ▲                                           │
//!           Dependency overlay                           check_mutation
//!            (batch pass)                               (enforcement point)
//! ```
//!
//! Every layer narrows; no layer ever widens. Deny wins, and resolution is
//! never fatal: partially invalid input degrades to the conservative
//! default with a recorded violation.
//!
//! # Crate Architecture
//!
//! ```text
//! wam-types   (tokens, declarations, diagnostics)
//!     ↑
//! wam-policy  (GlobalPolicy, LicenseRegistry)
//!     ↑
//! wam-engine  (tree, cascade, constraints, cache)  ◄── THIS CRATE
//! ```
//!
//! Parsing markup into the tree and matching CSS selectors stay external:
//! hosts feed a [`PolicyTree`] and a [`SelectorMatch`] implementation, and
//! embed the engine as a library.
//!
//! # Example
//!
//! ```
//! use wam_engine::{NodeData, PolicyEngine, PolicyTree};
//! use wam_types::{InputTokens, OutputTokens};
//!
//! let mut tree = PolicyTree::new(
//!     NodeData::new().with_input_tokens(&["structure", "text"]),
//! );
//! let quote = tree
//!     .add_child(
//!         tree.root(),
//!         NodeData::new().with_license("CC-BY-ND-4.0"),
//!     )
//!     .expect("root exists");
//!
//! let engine = PolicyEngine::new(tree);
//! let policy = engine.get_effective(quote);
//!
//! assert_eq!(policy.input, InputTokens::STRUCTURE | InputTokens::TEXT);
//! assert_eq!(policy.output, OutputTokens::READONLY);
//! ```

mod cache;
mod cascade;
mod compliance;
mod constraints;
mod dependency;
mod effective;
mod engine;
mod selector;
mod tree;

pub use cache::CacheStats;
pub use effective::EffectivePolicy;
pub use engine::PolicyEngine;
pub use selector::{LabelMatcher, NoSelectors, SelectorMatch};
pub use tree::{NodeData, NodeRef, PolicyTree, TreeError};

// Re-export the vocabulary and policy types embedders need alongside the
// engine, so `wam_engine` works as a single entry point.
pub use wam_policy::{
    CategoryOverride, CategoryRule, DependencyRule, DependencyScope, FailureMode, GlobalPolicy,
    LicenseFacts, LicenseProfile, LicenseRegistry, PolicyConstraints, PolicyDefaults,
    RegistryError,
};
pub use wam_types::{
    DiagnosticCode, Facet, FacetDecl, Importance, InputTokens, MemoryTokens, NodeId, OutputTokens,
    ProvenanceLayer, Violation,
};
