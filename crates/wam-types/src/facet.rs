//! Per-facet declaration values.
//!
//! A node either declares a facet or inherits it. The cascade resolves the
//! tagged value with a fold from root to node rather than tree recursion,
//! which is what makes flat arena storage possible:
//!
//! ```text
//! Inherit       → keep the running value
//! Explicit(set) → replace the running value
//! ExplicitNone  → replace with the empty set; only a deeper *explicit*
//!                 declaration can widen past it (inheritance cannot)
//! ```

use crate::tokens::TokenSet;

/// The declared state of one facet on one node.
///
/// `ExplicitNone` is distinct from `Explicit(empty)`: it records that the
/// author wrote the `none` token, the absorbing declaration. The output
/// facet has no `none` token and never takes this variant.
///
/// # Example
///
/// ```
/// use wam_types::{FacetDecl, InputTokens};
///
/// let decl = FacetDecl::<InputTokens>::parse_tokens(&["structure", "text"]);
/// assert!(decl.unknown.is_empty());
/// assert_eq!(
///     decl.value,
///     FacetDecl::Explicit(InputTokens::STRUCTURE | InputTokens::TEXT),
/// );
///
/// // `none` absorbs everything declared alongside it.
/// let decl = FacetDecl::<InputTokens>::parse_tokens(&["text", "none"]);
/// assert_eq!(decl.value, FacetDecl::ExplicitNone);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetDecl<S> {
    /// No declaration; the facet flows down from the nearest ancestor.
    Inherit,
    /// An explicit token set; replaces the running cascade value.
    Explicit(S),
    /// The explicit `none` declaration; replaces with the empty set.
    ExplicitNone,
}

// Manual impl: the derive would demand `S: Default`, which the token set
// types do not provide.
impl<S> Default for FacetDecl<S> {
    fn default() -> Self {
        Self::Inherit
    }
}

/// Result of parsing a declared token list for one facet.
///
/// When `unknown` is non-empty the declaration was malformed and `value`
/// degrades to [`FacetDecl::Inherit`]; the caller records one
/// malformed-declaration diagnostic per unknown name. Malformed input never
/// aborts resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDecl<S> {
    /// The declaration to store on the node.
    pub value: FacetDecl<S>,
    /// Token names outside the facet's vocabulary, in declaration order.
    pub unknown: Vec<String>,
}

impl<S: TokenSet> FacetDecl<S> {
    /// Parses a declared token list.
    ///
    /// - An empty list is no declaration at all (`Inherit`).
    /// - Any unknown name poisons the whole facet declaration: the result is
    ///   `Inherit` and the unknown names are reported.
    /// - `none` (where the vocabulary has it) absorbs the other tokens and
    ///   yields `ExplicitNone`.
    pub fn parse_tokens(tokens: &[&str]) -> ParsedDecl<S> {
        if tokens.is_empty() {
            return ParsedDecl {
                value: FacetDecl::Inherit,
                unknown: Vec::new(),
            };
        }

        let mut set = S::empty_set();
        let mut saw_none = false;
        let mut unknown = Vec::new();
        for name in tokens {
            match S::parse_token(name) {
                Some(tok) if tok.is_empty_set() => saw_none = true,
                Some(tok) => set = set.union_with(tok),
                None => unknown.push((*name).to_string()),
            }
        }

        if !unknown.is_empty() {
            return ParsedDecl {
                value: FacetDecl::Inherit,
                unknown,
            };
        }

        let value = if saw_none {
            FacetDecl::ExplicitNone
        } else {
            FacetDecl::Explicit(set)
        };
        ParsedDecl {
            value,
            unknown: Vec::new(),
        }
    }
}

impl<S: Copy> FacetDecl<S> {
    /// Returns `true` if this is any explicit declaration.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Self::Inherit)
    }
}

impl<S: TokenSet> FacetDecl<S> {
    /// Applies this declaration to the running cascade value.
    ///
    /// The cascade fold calls this at every ancestor, root first; the
    /// nearest explicit declaration therefore wins.
    #[must_use]
    pub fn apply(self, running: S) -> S {
        match self {
            Self::Inherit => running,
            Self::Explicit(set) => set,
            Self::ExplicitNone => S::empty_set(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{InputTokens, MemoryTokens, OutputTokens};

    #[test]
    fn empty_list_is_inherit() {
        let parsed = FacetDecl::<InputTokens>::parse_tokens(&[]);
        assert_eq!(parsed.value, FacetDecl::Inherit);
        assert!(parsed.unknown.is_empty());
    }

    #[test]
    fn explicit_declaration() {
        let parsed = FacetDecl::<InputTokens>::parse_tokens(&["structure", "media"]);
        assert_eq!(
            parsed.value,
            FacetDecl::Explicit(InputTokens::STRUCTURE | InputTokens::MEDIA)
        );
    }

    #[test]
    fn none_is_absorbing() {
        let parsed = FacetDecl::<InputTokens>::parse_tokens(&["all", "none"]);
        assert_eq!(parsed.value, FacetDecl::ExplicitNone);

        let parsed = FacetDecl::<MemoryTokens>::parse_tokens(&["none", "training"]);
        assert_eq!(parsed.value, FacetDecl::ExplicitNone);
    }

    #[test]
    fn unknown_token_poisons_declaration() {
        let parsed = FacetDecl::<InputTokens>::parse_tokens(&["text", "pixels"]);
        assert_eq!(parsed.value, FacetDecl::Inherit);
        assert_eq!(parsed.unknown, vec!["pixels".to_string()]);
    }

    #[test]
    fn output_none_is_malformed() {
        // The output vocabulary has no `none` token; declaring it is a
        // malformed declaration, not an absorbing one.
        let parsed = FacetDecl::<OutputTokens>::parse_tokens(&["none"]);
        assert_eq!(parsed.value, FacetDecl::Inherit);
        assert_eq!(parsed.unknown, vec!["none".to_string()]);
    }

    #[test]
    fn apply_semantics() {
        let running = InputTokens::STRUCTURE | InputTokens::TEXT;

        assert_eq!(FacetDecl::<InputTokens>::Inherit.apply(running), running);
        assert_eq!(
            FacetDecl::Explicit(InputTokens::MEDIA).apply(running),
            InputTokens::MEDIA
        );
        assert_eq!(
            FacetDecl::<InputTokens>::ExplicitNone.apply(running),
            InputTokens::empty()
        );
    }

    #[test]
    fn is_explicit() {
        assert!(!FacetDecl::<InputTokens>::Inherit.is_explicit());
        assert!(FacetDecl::Explicit(InputTokens::TEXT).is_explicit());
        assert!(FacetDecl::<InputTokens>::ExplicitNone.is_explicit());
    }
}
