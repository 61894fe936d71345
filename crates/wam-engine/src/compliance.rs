//! License compliance checker — the ceiling intersection.
//!
//! The governing license (nearest ancestor-or-self tag) caps the output
//! facet: `final = constrained ∩ profile.allowed_output_tokens`, with
//! `mutable` counting as the full set on both sides. The intersection can
//! only narrow — a license ceiling is never a floor.
//!
//! An unknown license identifier does not abort resolution: the most
//! restrictive profile is substituted and the result is flagged as a
//! fallback. Conservatism is the safe default on ambiguity.

use wam_policy::{LicenseFacts, LicenseRegistry};
use wam_types::{NodeId, OutputTokens, Violation};

/// The compliance checker's result for one node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Compliance {
    /// The output set after the ceiling intersection.
    pub output: OutputTokens,
    /// Queryable compliance facts, present when a license governs the node.
    pub facts: Option<LicenseFacts>,
    /// Ceiling violations (removed explicitly-declared tokens).
    pub violations: Vec<Violation>,
}

/// Intersects `constrained` with the governing license's output ceiling.
///
/// A [`Violation::License`] is recorded only when the ceiling removed tokens
/// that were *explicitly declared* by the node or an ancestor
/// (`output_explicit`); silently narrowing a defaulted value is not worth
/// reporting. The narrowed set is returned and used either way — the
/// violation is diagnostic, not fatal.
pub(crate) fn check_license(
    node: NodeId,
    constrained: OutputTokens,
    output_explicit: bool,
    license_id: Option<&str>,
    registry: &LicenseRegistry,
) -> Compliance {
    let Some(license_id) = license_id else {
        return Compliance {
            output: constrained,
            facts: None,
            violations: Vec::new(),
        };
    };

    let (canonical, profile, fallback) = match registry.resolve(license_id) {
        Ok((canonical, profile)) => (canonical.to_string(), profile.clone(), false),
        Err(err) => {
            let (fallback_id, profile) = registry.most_restrictive();
            tracing::warn!(
                node = %node,
                license = license_id,
                error = %err,
                fallback = fallback_id,
                "license resolution failed: most restrictive profile substituted"
            );
            (fallback_id.to_string(), profile, true)
        }
    };

    let final_output = constrained.limited_to(profile.allowed_output_tokens);
    let removed = constrained.normalized() - final_output;

    let mut violations = Vec::new();
    if !removed.is_empty() && output_explicit {
        tracing::warn!(
            node = %node,
            license = %canonical,
            removed = %removed,
            "license ceiling removed explicitly declared output tokens"
        );
        violations.push(Violation::License {
            node,
            removed,
            license_id: canonical.clone(),
        });
    }

    Compliance {
        output: final_output,
        facts: Some(LicenseFacts::from_profile(&canonical, &profile, fallback)),
        violations,
    }
}
