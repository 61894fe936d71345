//! Selector matching seam.
//!
//! Selector matching itself is external: the engine only asks "does this
//! node match this pattern?" and hosts answer with whatever selector engine
//! they embed. The trait lives here so the resolution pipeline has no
//! dependency on any particular selector syntax.
//!
//! # Architecture
//!
//! ```text
//! SelectorMatch trait (THIS MODULE)   ← abstract, no selector syntax
//!          │
//!          ├── LabelMatcher   ← matches pre-computed node labels
//!          ├── NoSelectors    ← matches nothing (default-deny fixtures)
//!          └── (host) CSS engine adapter, XPath adapter, ...
//! ```

use crate::tree::NodeRef;

/// Answers selector-match queries for block-selectors and dependency rules.
///
/// Implementations must be cheap and pure: the engine may call `matches`
/// many times per resolution pass and assumes the answer only changes when
/// the tree structure or labels change.
///
/// # Example
///
/// ```
/// use wam_engine::{NodeData, PolicyTree, SelectorMatch};
///
/// struct CategoryMatcher;
///
/// impl SelectorMatch for CategoryMatcher {
///     fn matches(&self, node: wam_engine::NodeRef<'_>, selector: &str) -> bool {
///         node.category() == selector.strip_prefix('@')
///     }
/// }
///
/// let tree = PolicyTree::new(NodeData::new().with_category("quote"));
/// let node = tree.node_ref(tree.root()).expect("root exists");
/// assert!(CategoryMatcher.matches(node, "@quote"));
/// ```
pub trait SelectorMatch: Send + Sync {
    /// Returns `true` if `node` matches `selector`.
    fn matches(&self, node: NodeRef<'_>, selector: &str) -> bool;
}

/// Matches a selector string against the node's pre-computed label list.
///
/// Hosts that run a real selector engine during parsing can stamp each node
/// with the selectors it matches and use this matcher unchanged; it is also
/// exactly what tests and fixtures need for patterns like `.pull-quote`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelMatcher;

impl SelectorMatch for LabelMatcher {
    fn matches(&self, node: NodeRef<'_>, selector: &str) -> bool {
        node.labels().iter().any(|label| label == selector)
    }
}

/// Matches nothing.
///
/// Useful as a default for trees without selector metadata: block-selectors
/// and dependency rules simply never fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelectors;

impl SelectorMatch for NoSelectors {
    fn matches(&self, _node: NodeRef<'_>, _selector: &str) -> bool {
        false
    }
}
