//! Core types for the WAM policy engine.
//!
//! This crate provides the foundational vocabulary for resolving what an
//! automated content-consuming agent may do with a markup document: the
//! facet token sets, per-facet declarations, node identifiers, and the
//! diagnostic types the resolution pipeline reports through.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  wam-types   : tokens, declarations, diagnostics  ◄─ HERE │
//! ├──────────────────────────────────────────────────────────┤
//! │  wam-policy  : GlobalPolicy, LicenseRegistry              │
//! ├──────────────────────────────────────────────────────────┤
//! │  wam-engine  : tree, cascade, constraints, cache          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Permission Model
//!
//! ```text
//! Effective Permission = Cascade(declared ↓ tree)
//!                      ∩ GlobalPolicy(document)
//!                      ∩ License(content)
//! ```
//!
//! Three independent facets, each a token set: **input** (what the agent may
//! see), **output** (what it may do with the content), **memory** (what it
//! may retain). Every layer narrows; no layer ever widens. Deny wins.
//!
//! # Example
//!
//! ```
//! use wam_types::{FacetDecl, InputTokens, OutputTokens};
//!
//! // Declarations parse from the wire's lowercase token lists.
//! let decl = FacetDecl::<InputTokens>::parse_tokens(&["structure", "text"]);
//! assert!(decl.unknown.is_empty());
//!
//! // `mutable` implies every other output capability.
//! assert!(OutputTokens::MUTABLE.permits(OutputTokens::CONTENT));
//! ```

mod facet;
mod id;
mod tokens;
mod violation;

pub use facet::{FacetDecl, ParsedDecl};
pub use id::NodeId;
pub use tokens::{
    Facet, Importance, InputTokens, MemoryTokens, OutputTokens, ProvenanceLayer, TokenSet,
};
pub use violation::{assert_diagnostic_code, DiagnosticCode, Violation};
