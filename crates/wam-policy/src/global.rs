//! Document-wide policy.
//!
//! A [`GlobalPolicy`] is delivered once per document (by HTTP header or meta
//! tag — delivery is the host's job) and scopes every per-node resolution:
//!
//! - **defaults** seed the cascade when no ancestor declares a facet;
//! - **block-selectors** force input to `none` for matching nodes, the
//!   single highest-precedence rule in the system;
//! - **category-rules** narrow facets per intent category, in declaration
//!   order, first match wins;
//! - **dependencies** are structural prerequisites between node patterns,
//!   with a defined remedial action on failure.
//!
//! Each layer only narrows the sets it touches; none may widen.

use serde::{Deserialize, Serialize};
use wam_types::{InputTokens, MemoryTokens, OutputTokens};

/// Per-facet default token sets, used when the root provides no declaration.
///
/// The defaults are conservative: full input visibility, readonly output,
/// no retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDefaults {
    /// Default input scope.
    #[serde(default = "default_input", alias = "wam-policy-input")]
    pub input: InputTokens,
    /// Default output scope.
    #[serde(default = "default_output", alias = "wam-policy-output")]
    pub output: OutputTokens,
    /// Default memory scope.
    #[serde(default = "default_memory", alias = "wam-policy-memory")]
    pub memory: MemoryTokens,
}

fn default_input() -> InputTokens {
    InputTokens::ALL
}

fn default_output() -> OutputTokens {
    OutputTokens::READONLY
}

fn default_memory() -> MemoryTokens {
    MemoryTokens::empty()
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            memory: default_memory(),
        }
    }
}

/// A partial per-facet override attached to an intent category.
///
/// Facets left `None` pass through unchanged. A specified facet *replaces*
/// the cascaded value but is clamped by intersection with it — category
/// rules narrow, they never widen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOverride {
    /// Replacement input set, if the rule constrains input.
    #[serde(
        default,
        alias = "wam-policy-input",
        skip_serializing_if = "Option::is_none"
    )]
    pub input: Option<InputTokens>,
    /// Replacement output set, if the rule constrains output.
    #[serde(
        default,
        alias = "wam-policy-output",
        skip_serializing_if = "Option::is_none"
    )]
    pub output: Option<OutputTokens>,
    /// Replacement memory set, if the rule constrains memory.
    #[serde(
        default,
        alias = "wam-policy-memory",
        skip_serializing_if = "Option::is_none"
    )]
    pub memory: Option<MemoryTokens>,
}

impl CategoryOverride {
    /// Returns `true` if the override constrains nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none() && self.memory.is_none()
    }
}

/// One entry of the ordered category-rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    /// The intent category this rule applies to.
    pub category: String,
    /// The partial override it imposes.
    pub policy: CategoryOverride,
}

/// The search scope of a dependency rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    /// The requirement must be satisfied among the trigger's descendants or
    /// ancestors — content reachable under the same input-visibility
    /// boundary.
    #[default]
    Input,
    /// The requirement may be satisfied anywhere in the document.
    Document,
}

/// What happens when a dependency rule's requirement is not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureMode {
    /// Drop the trigger node's own declarations from the cascade (its
    /// inherited values still apply) and record a dependency violation.
    #[default]
    #[serde(rename = "omit-trigger")]
    OmitTrigger,
}

/// A structural prerequisite between two node patterns.
///
/// # Example
///
/// ```
/// use wam_policy::{DependencyRule, DependencyScope, FailureMode};
///
/// let rule: DependencyRule = serde_json::from_str(
///     r#"{
///         "trigger": ".pull-quote",
///         "requires": ".attribution",
///         "scope": "input",
///         "failure-mode": "omit-trigger"
///     }"#,
/// )
/// .expect("valid rule");
/// assert_eq!(rule.scope, DependencyScope::Input);
/// assert_eq!(rule.failure_mode, FailureMode::OmitTrigger);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRule {
    /// Selector for nodes that carry the requirement.
    pub trigger: String,
    /// Selector for the node that must exist in scope.
    pub requires: String,
    /// Where the requirement is searched for.
    #[serde(default)]
    pub scope: DependencyScope,
    /// Remedial action when the requirement is missing.
    #[serde(default, rename = "failure-mode")]
    pub failure_mode: FailureMode,
}

/// The constraint section of a global policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyConstraints {
    /// Nodes matching any of these selectors get input forced to `none`.
    #[serde(default, rename = "block-selectors")]
    pub block_selectors: Vec<String>,
    /// Ordered category overrides; first matching rule wins.
    #[serde(default, rename = "category-rules", with = "category_rules_serde")]
    pub category_rules: Vec<CategoryRule>,
    /// Ordered dependency rules, applied cumulatively.
    #[serde(default)]
    pub dependencies: Vec<DependencyRule>,
}

/// Document-wide policy: defaults plus constraints.
///
/// Lives as long as the document. The engine treats it as a versioned
/// copy-on-write value: replacing it bumps a generation and invalidates
/// cached resolutions, so independent documents never share mutable state.
///
/// # Example
///
/// ```
/// use wam_policy::GlobalPolicy;
///
/// let policy: GlobalPolicy = serde_json::from_str(
///     r#"{
///         "defaults": {
///             "input": ["structure", "text"],
///             "output": ["readonly"],
///             "memory": ["none"]
///         },
///         "constraints": {
///             "block-selectors": [".secret"],
///             "category-rules": {
///                 "advertisement": { "input": ["none"] }
///             }
///         }
///     }"#,
/// )
/// .expect("valid policy");
///
/// assert_eq!(policy.constraints.block_selectors, vec![".secret"]);
/// assert!(policy.category_override("advertisement").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalPolicy {
    /// Per-facet defaults seeding the cascade.
    #[serde(default)]
    pub defaults: PolicyDefaults,
    /// Block-selectors, category rules, and dependency rules.
    #[serde(default)]
    pub constraints: PolicyConstraints,
}

impl GlobalPolicy {
    /// Returns the first category rule matching `category`, if any.
    ///
    /// Rules are consulted in declaration order and evaluation stops at the
    /// first match.
    #[must_use]
    pub fn category_override(&self, category: &str) -> Option<&CategoryOverride> {
        self.constraints
            .category_rules
            .iter()
            .find(|rule| rule.category == category)
            .map(|rule| &rule.policy)
    }
}

/// Serde adapter keeping `category-rules` an ordered mapping on the wire
/// while preserving declaration order in memory.
mod category_rules_serde {
    use super::{CategoryOverride, CategoryRule};
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(rules: &[CategoryRule], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(rules.len()))?;
        for rule in rules {
            map.serialize_entry(&rule.category, &rule.policy)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<CategoryRule>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RulesVisitor;

        impl<'de> Visitor<'de> for RulesVisitor {
            type Value = Vec<CategoryRule>;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a mapping from category name to partial policy override")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut rules = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((category, policy)) =
                    access.next_entry::<String, CategoryOverride>()?
                {
                    rules.push(CategoryRule { category, policy });
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RulesVisitor)
    }
}
