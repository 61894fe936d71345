//! Resolution diagnostics.
//!
//! Nothing in normal resolution is fatal: malformed declarations, license
//! ceilings, and failed dependency rules all narrow the result and record a
//! [`Violation`] instead of aborting. The engine always yields a well-formed,
//! maximally conservative policy; violations are the audit trail of what was
//! narrowed or ignored along the way.
//!
//! Every diagnostic and error type carries a stable machine-readable code
//! via [`DiagnosticCode`], for programmatic handling and monitoring.

use crate::{Facet, NodeId, OutputTokens};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable machine-readable code interface for diagnostics and errors.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**, prefixed `WAM_`
/// - **Stable**: codes never change once defined (API contract)
///
/// # Example
///
/// ```
/// use wam_types::{DiagnosticCode, NodeId, OutputTokens, Violation};
///
/// let violation = Violation::MutationDenied {
///     node: NodeId::from_index(0),
///     requested: OutputTokens::CONTENT,
///     available: OutputTokens::READONLY,
/// };
/// assert_eq!(violation.code(), "WAM_MUTATION_DENIED");
/// assert!(!violation.is_fatal());
/// ```
pub trait DiagnosticCode {
    /// Returns the stable machine-readable code.
    fn code(&self) -> &'static str;

    /// Returns whether the condition aborts the operation that raised it.
    ///
    /// Violations are always non-fatal: resolution records them and keeps
    /// going with the narrowed result.
    fn is_fatal(&self) -> bool;
}

/// A non-fatal diagnostic recorded during policy resolution.
///
/// Violations ride on the resolved effective policy; they describe what was
/// narrowed, dropped, or denied, and for which node. They are diagnostic
/// output, never a reason to fail a query.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Violation {
    /// A facet declaration contained a token outside its vocabulary; the
    /// whole declaration for that facet was ignored.
    #[error("malformed {facet} declaration on {node}: unknown token '{token}'")]
    MalformedDeclaration {
        /// The node carrying the malformed declaration.
        node: NodeId,
        /// The facet whose declaration was ignored.
        facet: Facet,
        /// The offending token name.
        token: String,
    },

    /// The license ceiling removed output tokens that were explicitly
    /// declared by the node or an ancestor.
    #[error("license '{license_id}' removed declared output [{}] from {node}", .removed.names().join(", "))]
    License {
        /// The node whose output was narrowed.
        node: NodeId,
        /// The explicitly declared tokens the ceiling removed.
        removed: OutputTokens,
        /// The canonical license identifier that imposed the ceiling.
        license_id: String,
    },

    /// A dependency rule's requirement was not satisfied in scope; the
    /// trigger node's own declarations were dropped.
    #[error("dependency unsatisfied on {node}: trigger '{trigger}' requires '{requires}'")]
    Dependency {
        /// The trigger node whose declarations were dropped.
        node: NodeId,
        /// The rule's trigger selector.
        trigger: String,
        /// The rule's required selector.
        requires: String,
    },

    /// A mutation was requested with an output token the effective policy
    /// does not grant.
    #[error(
        "mutation denied on {node}: requested [{}], available [{}]",
        .requested.names().join(", "),
        .available.names().join(", ")
    )]
    MutationDenied {
        /// The node the mutation targeted.
        node: NodeId,
        /// The requested output tokens.
        requested: OutputTokens,
        /// The tokens the effective policy actually grants.
        available: OutputTokens,
    },
}

impl Violation {
    /// Returns the node this violation was recorded against.
    #[must_use]
    pub fn node(&self) -> NodeId {
        match self {
            Self::MalformedDeclaration { node, .. }
            | Self::License { node, .. }
            | Self::Dependency { node, .. }
            | Self::MutationDenied { node, .. } => *node,
        }
    }
}

impl DiagnosticCode for Violation {
    fn code(&self) -> &'static str {
        match self {
            Self::MalformedDeclaration { .. } => "WAM_MALFORMED_DECLARATION",
            Self::License { .. } => "WAM_LICENSE_CEILING",
            Self::Dependency { .. } => "WAM_DEPENDENCY_UNSATISFIED",
            Self::MutationDenied { .. } => "WAM_MUTATION_DENIED",
        }
    }

    fn is_fatal(&self) -> bool {
        false
    }
}

/// Validates that a diagnostic code follows the crate conventions.
///
/// # Checks
///
/// 1. Code is non-empty
/// 2. Code starts with `WAM_`
/// 3. Code is UPPER_SNAKE_CASE
///
/// # Panics
///
/// Panics with a descriptive message if validation fails. Intended for
/// tests that pin down the code of every variant.
pub fn assert_diagnostic_code<D: DiagnosticCode>(diag: &D) {
    let code = diag.code();

    assert!(!code.is_empty(), "diagnostic code must not be empty");
    assert!(
        code.starts_with("WAM_"),
        "diagnostic code '{code}' must start with 'WAM_'"
    );
    assert!(
        is_upper_snake_case(code),
        "diagnostic code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// Checks if a string is UPPER_SNAKE_CASE.
fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
