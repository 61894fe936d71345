//! Cascade resolver — root→node inheritance fold.
//!
//! Per facet, the nearest explicit declaration on the root→node path wins,
//! with the document defaults applying when nothing on the path declares.
//! This mirrors style-sheet cascading: authors get local override power
//! while defaults keep undeclared subtrees conservative.
//!
//! The explicit `none` declaration (input/memory facets) is *sticky*: being
//! itself explicit, it replaces the running value and only a deeper
//! explicit declaration can widen past it — inheritance alone never can.
//!
//! Nodes suppressed by a dependency rule's `omit-trigger` contribute no
//! declarations; their inherited values still flow through them.

use std::collections::HashSet;
use wam_policy::PolicyDefaults;
use wam_types::{InputTokens, MemoryTokens, NodeId, OutputTokens};

use crate::tree::PolicyTree;

/// The cascade's per-facet result for one node.
///
/// `*_explicit` records whether the value came from an explicit declaration
/// (node or ancestor) rather than the document default; the license checker
/// only reports ceiling violations against explicitly declared output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Inherited {
    pub input: InputTokens,
    pub input_explicit: bool,
    pub output: OutputTokens,
    pub output_explicit: bool,
    pub memory: MemoryTokens,
    pub memory_explicit: bool,
    /// Nearest ancestor-or-self license tag; governs the node's content.
    pub license: Option<String>,
}

/// Folds declarations along `path` (root first, queried node last).
///
/// The queried node's own declaration, if present and unsuppressed, is the
/// nearest and always wins over all ancestors.
pub(crate) fn resolve_inherited(
    tree: &PolicyTree,
    path: &[NodeId],
    defaults: &PolicyDefaults,
    suppressed: &HashSet<NodeId>,
) -> Inherited {
    let mut resolved = Inherited {
        input: defaults.input,
        input_explicit: false,
        output: defaults.output,
        output_explicit: false,
        memory: defaults.memory,
        memory_explicit: false,
        license: None,
    };

    for &id in path {
        let Some(data) = tree.data(id) else { continue };

        // License tags are content provenance, not policy declarations;
        // omit-trigger does not strip them.
        if let Some(license) = data.license() {
            resolved.license = Some(license.to_string());
        }

        if suppressed.contains(&id) {
            tracing::debug!(node = %id, "declarations suppressed by dependency rule");
            continue;
        }

        if data.input.is_explicit() {
            resolved.input = data.input.apply(resolved.input);
            resolved.input_explicit = true;
        }
        if data.output.is_explicit() {
            resolved.output = data.output.apply(resolved.output);
            resolved.output_explicit = true;
        }
        if data.memory.is_explicit() {
            resolved.memory = data.memory.apply(resolved.memory);
            resolved.memory_explicit = true;
        }
    }

    resolved
}
