//! Dependency rule evaluator — structural prerequisites between nodes.
//!
//! Rules like "a pull-quote requires an attribution nearby" cannot be
//! decided per node: they need sibling/ancestor structure. The evaluator
//! runs as a batch pass over the whole document and produces an *overlay*:
//! the set of trigger nodes whose own declarations are suppressed
//! (`omit-trigger`), plus the recorded violations.
//!
//! The overlay is recomputed lazily when the tree structure or the global
//! policy moves — a batch pass after a burst of mutations rather than
//! O(tree) work per single-node query, trading a small staleness window
//! inside a write burst for cheap steady-state queries.
//!
//! The requirement search is independent of block-selector masking:
//! block-selectors mask the input facet only, they do not hide nodes from
//! dependency resolution.

use std::collections::HashSet;
use wam_policy::{DependencyRule, DependencyScope, FailureMode};
use wam_types::{NodeId, Violation};

use crate::selector::SelectorMatch;
use crate::tree::PolicyTree;

/// The batch pass result, versioned for cache keying.
#[derive(Debug, Clone)]
pub(crate) struct DependencyOverlay {
    /// Trigger nodes whose own declarations are dropped from the cascade.
    pub suppressed: HashSet<NodeId>,
    /// One violation per unsatisfied (rule, trigger) pair, in rule order.
    pub violations: Vec<Violation>,
    /// Tree structure generation this overlay was computed against.
    pub structure_gen: u64,
    /// Global policy generation this overlay was computed against.
    pub global_gen: u64,
    /// Monotonically increasing overlay generation.
    pub generation: u64,
}

impl DependencyOverlay {
    /// An overlay that has never been computed; always stale.
    pub fn empty() -> Self {
        Self {
            suppressed: HashSet::new(),
            violations: Vec::new(),
            structure_gen: u64::MAX,
            global_gen: u64::MAX,
            generation: 0,
        }
    }

    /// Returns `true` if the overlay no longer matches the current inputs.
    pub fn stale(&self, structure_gen: u64, global_gen: u64) -> bool {
        self.structure_gen != structure_gen || self.global_gen != global_gen
    }
}

/// Evaluates all dependency rules over the document.
///
/// Rules are evaluated in declaration order and compose cumulatively: a
/// node may be suppressed by several rules (the set union makes repeats
/// harmless), and each unsatisfied pair records its own violation.
pub(crate) fn evaluate(
    tree: &PolicyTree,
    rules: &[DependencyRule],
    matcher: &dyn SelectorMatch,
) -> (HashSet<NodeId>, Vec<Violation>) {
    let mut suppressed = HashSet::new();
    let mut violations = Vec::new();
    if rules.is_empty() {
        return (suppressed, violations);
    }

    let document = tree.document_order();
    for rule in rules {
        for &trigger in &document {
            let Some(node) = tree.node_ref(trigger) else { continue };
            if !matcher.matches(node, &rule.trigger) {
                continue;
            }
            if requirement_satisfied(tree, trigger, rule, matcher, &document) {
                continue;
            }

            match rule.failure_mode {
                FailureMode::OmitTrigger => {
                    tracing::warn!(
                        node = %trigger,
                        trigger = %rule.trigger,
                        requires = %rule.requires,
                        "dependency unsatisfied: trigger declarations omitted"
                    );
                    suppressed.insert(trigger);
                    violations.push(Violation::Dependency {
                        node: trigger,
                        trigger: rule.trigger.clone(),
                        requires: rule.requires.clone(),
                    });
                }
            }
        }
    }

    (suppressed, violations)
}

/// Looks for at least one node matching `rule.requires` within the rule's
/// scope. The trigger itself never satisfies its own requirement.
fn requirement_satisfied(
    tree: &PolicyTree,
    trigger: NodeId,
    rule: &DependencyRule,
    matcher: &dyn SelectorMatch,
    document: &[NodeId],
) -> bool {
    let mut candidates: Vec<NodeId> = match rule.scope {
        // Nearest-ancestor-or-descendant: content reachable under the same
        // input-visibility boundary as the trigger.
        DependencyScope::Input => {
            let mut nodes = tree.descendants(trigger);
            if let Some(path) = tree.path_from_root(trigger) {
                nodes.extend(path.into_iter().filter(|&id| id != trigger));
            }
            nodes
        }
        DependencyScope::Document => document.to_vec(),
    };
    candidates.retain(|&id| id != trigger);

    candidates.into_iter().any(|id| {
        tree.node_ref(id)
            .is_some_and(|node| matcher.matches(node, &rule.requires))
    })
}
