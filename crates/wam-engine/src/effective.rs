//! The resolved per-node policy snapshot.

use serde::Serialize;
use wam_policy::LicenseFacts;
use wam_types::{InputTokens, MemoryTokens, OutputTokens, Violation};

/// The effective permission set for one node — an immutable snapshot.
///
/// Computed lazily on first query and memoized; a snapshot is never mutated
/// after construction (invalidation replaces the whole entry), so holding an
/// `Arc<EffectivePolicy>` across engine writes is always safe — it just may
/// go stale.
///
/// The output set is normalized: if `mutable` was granted, every output
/// token is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectivePolicy {
    /// What the agent may see of the node.
    pub input: InputTokens,
    /// What the agent may do with content derived from the node.
    pub output: OutputTokens,
    /// What the agent may retain.
    pub memory: MemoryTokens,
    /// Compliance facts for the governing license, if any.
    pub license: Option<LicenseFacts>,
    /// Diagnostics recorded while resolving this node.
    pub violations: Vec<Violation>,
}

impl EffectivePolicy {
    /// The maximally conservative policy: see nothing, do nothing, retain
    /// nothing.
    ///
    /// Returned for ids the engine cannot resolve at all (foreign ids);
    /// conservatism is the safe default on any ambiguity.
    #[must_use]
    pub fn conservative() -> Self {
        Self {
            input: InputTokens::empty(),
            output: OutputTokens::empty(),
            memory: MemoryTokens::empty(),
            license: None,
            violations: Vec::new(),
        }
    }

    /// Returns `true` if the effective output grants everything `requested`
    /// asks for (`mutable` counts as the full set on both sides).
    #[must_use]
    pub fn permits(&self, requested: OutputTokens) -> bool {
        self.output.permits(requested)
    }

    /// Returns `true` if any violations were recorded during resolution.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conservative_grants_nothing() {
        let policy = EffectivePolicy::conservative();
        assert_eq!(policy.input, InputTokens::empty());
        assert_eq!(policy.output, OutputTokens::empty());
        assert_eq!(policy.memory, MemoryTokens::empty());
        assert!(!policy.permits(OutputTokens::READONLY));
        assert!(!policy.has_violations());
    }

    #[test]
    fn permits_normalizes_mutable() {
        let policy = EffectivePolicy {
            output: OutputTokens::MUTABLE,
            ..EffectivePolicy::conservative()
        };
        assert!(policy.permits(OutputTokens::CONTENT | OutputTokens::APPEND));
    }

    #[test]
    fn serializes_with_token_names() {
        let policy = EffectivePolicy {
            input: InputTokens::TEXT,
            output: OutputTokens::READONLY,
            ..EffectivePolicy::conservative()
        };
        let json = serde_json::to_value(&policy).expect("serialize");
        assert_eq!(json["input"], serde_json::json!(["text"]));
        assert_eq!(json["output"], serde_json::json!(["readonly"]));
        assert_eq!(json["memory"], serde_json::json!(["none"]));
    }
}
