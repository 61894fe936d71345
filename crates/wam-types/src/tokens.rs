//! Facet token vocabularies.
//!
//! Permissions are expressed in three independent facets, each with a fixed
//! token vocabulary:
//!
//! | Facet | Tokens | Combination |
//! |-------|--------|-------------|
//! | [`InputTokens`] | `none, structure, text, attributes, media, all` | set, `none` absorbing |
//! | [`OutputTokens`] | `readonly, style, interaction, layout, annotation, content, data, append, mutable` | set, `mutable` implies all |
//! | [`MemoryTokens`] | `none, session, user, training` | set, `none` absorbing |
//!
//! All layers of the resolution pipeline combine these sets by intersection
//! or replacement. Narrowing wins: no layer may widen a set it receives.
//!
//! # Wire form
//!
//! Tokens travel as lists of lowercase names (`["structure", "text"]`).
//! `none` is the empty set of its facet and absorbs any other token declared
//! alongside it. Serde support uses the name-list form, never raw bits.
//!
//! # Example
//!
//! ```
//! use wam_types::{InputTokens, OutputTokens};
//!
//! let (input, unknown) = InputTokens::parse_list(&["structure", "text"]);
//! assert_eq!(input, InputTokens::STRUCTURE | InputTokens::TEXT);
//! assert!(unknown.is_empty());
//!
//! // `mutable` implies every other output capability.
//! let output = OutputTokens::MUTABLE;
//! assert!(output.permits(OutputTokens::ANNOTATION));
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// One of the three independent permission dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    /// What structural/content detail the agent may see.
    Input,
    /// What the agent may do with content derived from the node.
    Output,
    /// What the agent may retain.
    Memory,
}

impl Facet {
    /// Returns the lowercase facet name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common surface of the three facet token sets.
///
/// Exists so that facet-generic code (declaration parsing, the cascade fold)
/// can be written once. Concrete set types add facet-specific operations on
/// top (e.g. [`OutputTokens::normalized`]).
pub trait TokenSet: Copy + Eq + std::fmt::Debug {
    /// The facet this vocabulary belongs to.
    const FACET: Facet;

    /// The empty set. Where the vocabulary has a `none` token, this is it.
    fn empty_set() -> Self;

    /// Set union.
    fn union_with(self, other: Self) -> Self;

    /// Parses a single lowercase token name.
    ///
    /// Returns `None` for names outside this facet's vocabulary.
    fn parse_token(name: &str) -> Option<Self>;

    /// Returns `true` if the set is empty (`none`).
    fn is_empty_set(self) -> bool;
}

bitflags! {
    /// Input-facet tokens: what detail of a node an agent may consume.
    ///
    /// The wire tokens `none` and `all` are the empty set and the full set;
    /// they do not get their own bits. `none` is absorbing: declared
    /// alongside any other token it wins (see
    /// [`FacetDecl::parse_tokens`](crate::FacetDecl::parse_tokens)).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputTokens: u8 {
        /// Element tree shape, tag names, nesting.
        const STRUCTURE  = 0b0000_0001;
        /// Text content.
        const TEXT       = 0b0000_0010;
        /// Attribute names and values.
        const ATTRIBUTES = 0b0000_0100;
        /// Embedded media (images, audio, video).
        const MEDIA      = 0b0000_1000;
    }
}

impl InputTokens {
    /// The `all` wire token: every input detail.
    pub const ALL: Self = Self::STRUCTURE
        .union(Self::TEXT)
        .union(Self::ATTRIBUTES)
        .union(Self::MEDIA);

    /// Parses a lowercase token name.
    ///
    /// `"none"` parses to the empty set, `"all"` to [`ALL`](Self::ALL).
    ///
    /// # Example
    ///
    /// ```
    /// use wam_types::InputTokens;
    ///
    /// assert_eq!(InputTokens::parse("text"), Some(InputTokens::TEXT));
    /// assert_eq!(InputTokens::parse("none"), Some(InputTokens::empty()));
    /// assert_eq!(InputTokens::parse("all"), Some(InputTokens::ALL));
    /// assert_eq!(InputTokens::parse("pixels"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::empty()),
            "structure" => Some(Self::STRUCTURE),
            "text" => Some(Self::TEXT),
            "attributes" => Some(Self::ATTRIBUTES),
            "media" => Some(Self::MEDIA),
            "all" => Some(Self::ALL),
            _ => None,
        }
    }

    /// Parses a list of token names into a combined set.
    ///
    /// Returns the combined set and the names that were not recognized.
    /// `none` absorbs: if present, the result is the empty set regardless of
    /// the other recognized names. Callers decide how to treat unknown names
    /// (the policy tree ignores the whole declaration and records a
    /// malformed-declaration diagnostic).
    #[must_use]
    pub fn parse_list<'a>(names: &[&'a str]) -> (Self, Vec<&'a str>) {
        parse_name_list(names)
    }

    /// Returns the lowercase token names for this set.
    ///
    /// The empty set reports as `["none"]`, matching the wire form.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        if self.is_empty() {
            return vec!["none"];
        }
        if self == Self::ALL {
            return vec!["all"];
        }
        let mut names = Vec::new();
        if self.contains(Self::STRUCTURE) {
            names.push("structure");
        }
        if self.contains(Self::TEXT) {
            names.push("text");
        }
        if self.contains(Self::ATTRIBUTES) {
            names.push("attributes");
        }
        if self.contains(Self::MEDIA) {
            names.push("media");
        }
        names
    }
}

bitflags! {
    /// Output-facet tokens: what an agent may do with content from a node.
    ///
    /// These do not form a total order and are combined as a set. `mutable`
    /// implies the broadest capability: a set containing [`MUTABLE`]
    /// (`Self::MUTABLE`) grants everything, which
    /// [`normalized`](Self::normalized) makes explicit so that plain
    /// intersection implements license ceilings and mutation checks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OutputTokens: u16 {
        /// Quote or reference the content verbatim.
        const READONLY    = 0b0_0000_0001;
        /// Restyle the content's presentation.
        const STYLE       = 0b0_0000_0010;
        /// Operate interactive controls.
        const INTERACTION = 0b0_0000_0100;
        /// Rearrange layout and topology.
        const LAYOUT      = 0b0_0000_1000;
        /// Attach annotations without altering the content.
        const ANNOTATION  = 0b0_0001_0000;
        /// Rewrite or derive from the content itself.
        const CONTENT     = 0b0_0010_0000;
        /// Extract and reuse embedded data.
        const DATA        = 0b0_0100_0000;
        /// Append new sibling content.
        const APPEND      = 0b0_1000_0000;
        /// Full mutation rights; implies every other output token.
        const MUTABLE     = 0b1_0000_0000;
    }
}

impl OutputTokens {
    /// Every output token.
    pub const ALL: Self = Self::READONLY
        .union(Self::STYLE)
        .union(Self::INTERACTION)
        .union(Self::LAYOUT)
        .union(Self::ANNOTATION)
        .union(Self::CONTENT)
        .union(Self::DATA)
        .union(Self::APPEND)
        .union(Self::MUTABLE);

    /// Parses a lowercase token name.
    ///
    /// There is no `none` output token; an output declaration cannot opt out
    /// of the facet, only narrow it.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "readonly" => Some(Self::READONLY),
            "style" => Some(Self::STYLE),
            "interaction" => Some(Self::INTERACTION),
            "layout" => Some(Self::LAYOUT),
            "annotation" => Some(Self::ANNOTATION),
            "content" => Some(Self::CONTENT),
            "data" => Some(Self::DATA),
            "append" => Some(Self::APPEND),
            "mutable" => Some(Self::MUTABLE),
            _ => None,
        }
    }

    /// Parses a list of token names into a combined set.
    ///
    /// Returns the combined set and the names that were not recognized.
    #[must_use]
    pub fn parse_list<'a>(names: &[&'a str]) -> (Self, Vec<&'a str>) {
        parse_name_list(names)
    }

    /// Expands the `mutable`-implies-all rule.
    ///
    /// Returns [`ALL`](Self::ALL) if the set contains
    /// [`MUTABLE`](Self::MUTABLE), the set unchanged otherwise. Every
    /// semantic comparison (ceilings, mutation checks) goes through this.
    ///
    /// # Example
    ///
    /// ```
    /// use wam_types::OutputTokens;
    ///
    /// assert_eq!(OutputTokens::MUTABLE.normalized(), OutputTokens::ALL);
    /// assert_eq!(
    ///     OutputTokens::READONLY.normalized(),
    ///     OutputTokens::READONLY,
    /// );
    /// ```
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.contains(Self::MUTABLE) {
            Self::ALL
        } else {
            self
        }
    }

    /// Returns `true` if this set grants everything `requested` asks for.
    ///
    /// Both sides are normalized first, so `mutable` on either side behaves
    /// as the full set.
    #[must_use]
    pub fn permits(self, requested: Self) -> bool {
        self.normalized().contains(requested.normalized())
    }

    /// Intersects this set with a ceiling, normalizing both sides.
    ///
    /// This is the license-ceiling operation: the result never exceeds
    /// either operand and `mutable` counts as the full set on both sides.
    ///
    /// # Example
    ///
    /// ```
    /// use wam_types::OutputTokens;
    ///
    /// // A `mutable` declaration under a readonly-only ceiling degrades
    /// // to readonly rather than to nothing.
    /// let narrowed = OutputTokens::MUTABLE.limited_to(OutputTokens::READONLY);
    /// assert_eq!(narrowed, OutputTokens::READONLY);
    /// ```
    #[must_use]
    pub fn limited_to(self, ceiling: Self) -> Self {
        self.normalized() & ceiling.normalized()
    }

    /// Returns the lowercase token names for this set.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::READONLY) {
            names.push("readonly");
        }
        if self.contains(Self::STYLE) {
            names.push("style");
        }
        if self.contains(Self::INTERACTION) {
            names.push("interaction");
        }
        if self.contains(Self::LAYOUT) {
            names.push("layout");
        }
        if self.contains(Self::ANNOTATION) {
            names.push("annotation");
        }
        if self.contains(Self::CONTENT) {
            names.push("content");
        }
        if self.contains(Self::DATA) {
            names.push("data");
        }
        if self.contains(Self::APPEND) {
            names.push("append");
        }
        if self.contains(Self::MUTABLE) {
            names.push("mutable");
        }
        names
    }
}

bitflags! {
    /// Memory-facet tokens: what an agent may retain, by increasing
    /// retention breadth.
    ///
    /// The wire token `none` is the empty set and absorbs any other token
    /// declared alongside it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryTokens: u8 {
        /// Retention within the current session only.
        const SESSION  = 0b0000_0001;
        /// Retention in the user's persistent profile.
        const USER     = 0b0000_0010;
        /// Retention in training corpora.
        const TRAINING = 0b0000_0100;
    }
}

impl MemoryTokens {
    /// Every retention scope.
    pub const ALL: Self = Self::SESSION.union(Self::USER).union(Self::TRAINING);

    /// Parses a lowercase token name. `"none"` parses to the empty set.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::empty()),
            "session" => Some(Self::SESSION),
            "user" => Some(Self::USER),
            "training" => Some(Self::TRAINING),
            _ => None,
        }
    }

    /// Parses a list of token names into a combined set.
    ///
    /// Returns the combined set and the names that were not recognized.
    /// `none` absorbs the other recognized names.
    #[must_use]
    pub fn parse_list<'a>(names: &[&'a str]) -> (Self, Vec<&'a str>) {
        parse_name_list(names)
    }

    /// Returns the name of the widest retention scope in this set.
    ///
    /// # Example
    ///
    /// ```
    /// use wam_types::MemoryTokens;
    ///
    /// assert_eq!(MemoryTokens::empty().broadest(), "none");
    /// assert_eq!(
    ///     (MemoryTokens::SESSION | MemoryTokens::USER).broadest(),
    ///     "user",
    /// );
    /// ```
    #[must_use]
    pub fn broadest(self) -> &'static str {
        if self.contains(Self::TRAINING) {
            "training"
        } else if self.contains(Self::USER) {
            "user"
        } else if self.contains(Self::SESSION) {
            "session"
        } else {
            "none"
        }
    }

    /// Returns the lowercase token names for this set.
    ///
    /// The empty set reports as `["none"]`, matching the wire form.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        if self.is_empty() {
            return vec!["none"];
        }
        let mut names = Vec::new();
        if self.contains(Self::SESSION) {
            names.push("session");
        }
        if self.contains(Self::USER) {
            names.push("user");
        }
        if self.contains(Self::TRAINING) {
            names.push("training");
        }
        names
    }
}

/// Shared `parse_list` body. `none` (any token parsing to the empty set)
/// absorbs the other recognized names.
fn parse_name_list<'a, S: TokenSet>(names: &[&'a str]) -> (S, Vec<&'a str>) {
    let mut set = S::empty_set();
    let mut saw_none = false;
    let mut unknown = Vec::new();
    for name in names {
        match S::parse_token(name) {
            Some(tok) if tok.is_empty_set() => saw_none = true,
            Some(tok) => set = set.union_with(tok),
            None => unknown.push(*name),
        }
    }
    if saw_none {
        set = S::empty_set();
    }
    (set, unknown)
}

macro_rules! impl_token_set {
    ($ty:ident, $facet:expr) => {
        impl TokenSet for $ty {
            const FACET: Facet = $facet;

            fn empty_set() -> Self {
                Self::empty()
            }

            fn union_with(self, other: Self) -> Self {
                self | other
            }

            fn parse_token(name: &str) -> Option<Self> {
                Self::parse(name)
            }

            fn is_empty_set(self) -> bool {
                self.is_empty()
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let names = self.names();
                if names.is_empty() {
                    write!(f, "(none)")
                } else {
                    write!(f, "{}", names.join(" | "))
                }
            }
        }

        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_seq(self.names())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let names = Vec::<String>::deserialize(deserializer)?;
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                let (set, unknown) = Self::parse_list(&refs);
                if let Some(bad) = unknown.first() {
                    return Err(serde::de::Error::custom(format!(
                        "unknown {} token '{}'",
                        Self::FACET,
                        bad
                    )));
                }
                Ok(set)
            }
        }
    };
}

impl_token_set!(InputTokens, Facet::Input);
impl_token_set!(OutputTokens, Facet::Output);
impl_token_set!(MemoryTokens, Facet::Memory);

/// Intent importance levels, by increasing priority.
///
/// Part of the intent vocabulary carried on nodes as metadata. Importance
/// does not participate in permission resolution.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Background information only.
    Background,
    /// Supplementary; may be dropped under context pressure.
    Low,
    /// Ordinary content.
    #[default]
    Normal,
    /// Prioritized content.
    High,
    /// Essential for the task at hand.
    Critical,
}

impl Importance {
    /// Parses a lowercase level name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "background" => Some(Self::Background),
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Returns the lowercase level name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document provenance layers.
///
/// Each layer names an aspect of a document an agent-driven mutation can
/// touch. A layer is gated by exactly one output token
/// ([`required_output`](Self::required_output)), which the mutation checker
/// uses for per-layer permission queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceLayer {
    /// The content itself.
    Content,
    /// Presentation and styling.
    Style,
    /// Interactive behavior.
    Interaction,
    /// Document topology and layout.
    Topology,
    /// Embedded machine-readable data.
    Data,
    /// Declared intent metadata.
    Intent,
}

impl ProvenanceLayer {
    /// All layers, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Content,
        Self::Style,
        Self::Interaction,
        Self::Topology,
        Self::Data,
        Self::Intent,
    ];

    /// The output token that gates mutating this layer.
    #[must_use]
    pub fn required_output(self) -> OutputTokens {
        match self {
            Self::Content => OutputTokens::CONTENT,
            Self::Style => OutputTokens::STYLE,
            Self::Interaction => OutputTokens::INTERACTION,
            Self::Topology => OutputTokens::LAYOUT,
            Self::Data => OutputTokens::DATA,
            Self::Intent => OutputTokens::ANNOTATION,
        }
    }

    /// Parses a lowercase layer name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "content" => Some(Self::Content),
            "style" => Some(Self::Style),
            "interaction" => Some(Self::Interaction),
            "topology" => Some(Self::Topology),
            "data" => Some(Self::Data),
            "intent" => Some(Self::Intent),
            _ => None,
        }
    }

    /// Returns the lowercase layer name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Style => "style",
            Self::Interaction => "interaction",
            Self::Topology => "topology",
            Self::Data => "data",
            Self::Intent => "intent",
        }
    }
}

impl std::fmt::Display for ProvenanceLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_all_contains_every_token() {
        assert!(InputTokens::ALL.contains(InputTokens::STRUCTURE));
        assert!(InputTokens::ALL.contains(InputTokens::TEXT));
        assert!(InputTokens::ALL.contains(InputTokens::ATTRIBUTES));
        assert!(InputTokens::ALL.contains(InputTokens::MEDIA));
    }

    #[test]
    fn input_parse_special_tokens() {
        assert_eq!(InputTokens::parse("none"), Some(InputTokens::empty()));
        assert_eq!(InputTokens::parse("all"), Some(InputTokens::ALL));
        assert_eq!(InputTokens::parse("NONE"), None); // case-sensitive wire form
    }

    #[test]
    fn input_none_absorbs_in_list() {
        let (set, unknown) = InputTokens::parse_list(&["text", "none", "media"]);
        assert_eq!(set, InputTokens::empty());
        assert!(unknown.is_empty());
    }

    #[test]
    fn input_parse_list_reports_unknown() {
        let (set, unknown) = InputTokens::parse_list(&["text", "pixels", "media"]);
        assert_eq!(set, InputTokens::TEXT | InputTokens::MEDIA);
        assert_eq!(unknown, vec!["pixels"]);
    }

    #[test]
    fn input_names_roundtrip() {
        let set = InputTokens::STRUCTURE | InputTokens::ATTRIBUTES;
        assert_eq!(set.names(), vec!["structure", "attributes"]);

        assert_eq!(InputTokens::empty().names(), vec!["none"]);
        assert_eq!(InputTokens::ALL.names(), vec!["all"]);
    }

    #[test]
    fn input_display() {
        assert_eq!(InputTokens::empty().to_string(), "none");
        assert_eq!(
            (InputTokens::STRUCTURE | InputTokens::TEXT).to_string(),
            "structure | text"
        );
    }

    #[test]
    fn output_mutable_normalizes_to_all() {
        assert_eq!(OutputTokens::MUTABLE.normalized(), OutputTokens::ALL);
        assert_eq!(
            (OutputTokens::READONLY | OutputTokens::MUTABLE).normalized(),
            OutputTokens::ALL
        );
        let plain = OutputTokens::READONLY | OutputTokens::ANNOTATION;
        assert_eq!(plain.normalized(), plain);
    }

    #[test]
    fn output_permits_via_mutable() {
        assert!(OutputTokens::MUTABLE.permits(OutputTokens::CONTENT));
        assert!(OutputTokens::MUTABLE.permits(OutputTokens::MUTABLE));
        assert!(!OutputTokens::READONLY.permits(OutputTokens::MUTABLE));
        assert!(!OutputTokens::READONLY.permits(OutputTokens::ANNOTATION));
        assert!(OutputTokens::READONLY.permits(OutputTokens::READONLY));
    }

    #[test]
    fn output_limited_to_ceiling() {
        // mutable under a readonly ceiling degrades to readonly
        assert_eq!(
            OutputTokens::MUTABLE.limited_to(OutputTokens::READONLY),
            OutputTokens::READONLY
        );
        // mutable under a mutable ceiling keeps everything
        assert_eq!(
            OutputTokens::MUTABLE.limited_to(OutputTokens::MUTABLE),
            OutputTokens::ALL
        );
        // plain intersection otherwise
        assert_eq!(
            (OutputTokens::READONLY | OutputTokens::ANNOTATION)
                .limited_to(OutputTokens::READONLY),
            OutputTokens::READONLY
        );
    }

    #[test]
    fn output_has_no_none_token() {
        assert_eq!(OutputTokens::parse("none"), None);
        let (set, unknown) = OutputTokens::parse_list(&["readonly", "none"]);
        assert_eq!(set, OutputTokens::READONLY);
        assert_eq!(unknown, vec!["none"]);
    }

    #[test]
    fn output_names_in_vocabulary_order() {
        let set = OutputTokens::READONLY | OutputTokens::ANNOTATION | OutputTokens::MUTABLE;
        assert_eq!(set.names(), vec!["readonly", "annotation", "mutable"]);
        assert!(OutputTokens::empty().names().is_empty());
        assert_eq!(OutputTokens::empty().to_string(), "(none)");
    }

    #[test]
    fn memory_none_absorbs() {
        let (set, unknown) = MemoryTokens::parse_list(&["session", "none", "training"]);
        assert_eq!(set, MemoryTokens::empty());
        assert!(unknown.is_empty());
    }

    #[test]
    fn memory_broadest_ordering() {
        assert_eq!(MemoryTokens::empty().broadest(), "none");
        assert_eq!(MemoryTokens::SESSION.broadest(), "session");
        assert_eq!(
            (MemoryTokens::SESSION | MemoryTokens::USER).broadest(),
            "user"
        );
        assert_eq!(MemoryTokens::ALL.broadest(), "training");
    }

    #[test]
    fn serde_uses_name_lists() {
        let set = InputTokens::STRUCTURE | InputTokens::TEXT;
        let json = serde_json::to_string(&set).expect("serialize");
        assert_eq!(json, r#"["structure","text"]"#);

        let parsed: InputTokens = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, set);
    }

    #[test]
    fn serde_empty_input_is_none() {
        let json = serde_json::to_string(&InputTokens::empty()).expect("serialize");
        assert_eq!(json, r#"["none"]"#);

        let parsed: InputTokens = serde_json::from_str(r#"["none"]"#).expect("deserialize");
        assert_eq!(parsed, InputTokens::empty());
    }

    #[test]
    fn serde_rejects_unknown_token() {
        let err = serde_json::from_str::<OutputTokens>(r#"["readonly","shiny"]"#);
        assert!(err.is_err());
        let msg = err.expect_err("must fail").to_string();
        assert!(msg.contains("shiny"), "got: {msg}");
    }

    #[test]
    fn importance_ordering() {
        assert!(Importance::Critical > Importance::High);
        assert!(Importance::High > Importance::Normal);
        assert!(Importance::Normal > Importance::Low);
        assert!(Importance::Low > Importance::Background);
        assert_eq!(Importance::default(), Importance::Normal);
    }

    #[test]
    fn importance_parse_roundtrip() {
        for level in [
            Importance::Critical,
            Importance::High,
            Importance::Normal,
            Importance::Low,
            Importance::Background,
        ] {
            assert_eq!(Importance::parse(level.as_str()), Some(level));
        }
        assert_eq!(Importance::parse("urgent"), None);
    }

    #[test]
    fn provenance_layer_output_mapping() {
        assert_eq!(
            ProvenanceLayer::Content.required_output(),
            OutputTokens::CONTENT
        );
        assert_eq!(
            ProvenanceLayer::Topology.required_output(),
            OutputTokens::LAYOUT
        );
        assert_eq!(
            ProvenanceLayer::Intent.required_output(),
            OutputTokens::ANNOTATION
        );
    }

    #[test]
    fn provenance_layer_parse_roundtrip() {
        for layer in ProvenanceLayer::ALL {
            assert_eq!(ProvenanceLayer::parse(layer.as_str()), Some(layer));
        }
        assert_eq!(ProvenanceLayer::parse("metadata"), None);
    }
}
