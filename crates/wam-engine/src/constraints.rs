//! Global constraint applier — category rules and block-selectors.
//!
//! Applied after the cascade, before license compliance. Each layer may only
//! narrow the sets it touches:
//!
//! 1. **Category rules**: the first rule (declaration order) matching the
//!    node's intent category replaces the facets it specifies, clamped by
//!    intersection with the cascaded value.
//! 2. **Block-selectors**: a matching node gets input forced to `none`.
//!    This runs last so it holds against everything, including category
//!    overrides — it is the single highest-precedence rule in the system.

use wam_policy::GlobalPolicy;
use wam_types::{InputTokens, MemoryTokens, OutputTokens};

use crate::cascade::Inherited;
use crate::selector::SelectorMatch;
use crate::tree::NodeRef;

/// The constraint applier's result for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Constrained {
    pub input: InputTokens,
    pub output: OutputTokens,
    pub memory: MemoryTokens,
    /// A block-selector matched and forced input to `none`.
    pub blocked: bool,
}

/// Applies the document-wide constraints to a cascaded value.
pub(crate) fn apply_constraints(
    node: NodeRef<'_>,
    inherited: &Inherited,
    global: &GlobalPolicy,
    matcher: &dyn SelectorMatch,
) -> Constrained {
    let mut input = inherited.input;
    let mut output = inherited.output;
    let mut memory = inherited.memory;

    if let Some(category) = node.category() {
        if let Some(rule) = global.category_override(category) {
            // Replace-then-clamp: the override substitutes the facet value
            // but can never exceed what the cascade granted.
            if let Some(forced) = rule.input {
                input = forced & input;
            }
            if let Some(forced) = rule.output {
                output = forced.limited_to(output);
            }
            if let Some(forced) = rule.memory {
                memory = forced & memory;
            }
            tracing::debug!(
                node = %node.id,
                category = category,
                input = %input,
                output = %output,
                memory = %memory,
                "category rule applied"
            );
        }
    }

    let blocked = global
        .constraints
        .block_selectors
        .iter()
        .any(|selector| matcher.matches(node, selector));
    if blocked {
        input = InputTokens::empty();
        tracing::debug!(node = %node.id, "block-selector matched: input forced to none");
    }

    Constrained {
        input,
        output,
        memory,
        blocked,
    }
}
