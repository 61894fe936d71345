//! License compliance profiles.
//!
//! A [`LicenseProfile`] maps a content license to the *ceiling* of output
//! permissions an agent may exercise over that content, plus the compliance
//! flags downstream reporting needs (attribution, copyleft, commercial use,
//! share-alike). The ceiling is always applied as a set intersection, never
//! an addition: a license can only narrow what the cascade granted.
//!
//! Profiles are immutable once loaded; the registry owns them as read-only
//! state after initialization.

use serde::{Deserialize, Serialize};
use wam_types::OutputTokens;

/// Compliance profile for one license, keyed by its canonical identifier.
///
/// # Wire form
///
/// Profiles deserialize from the camelCase shape license catalogs deliver:
///
/// ```
/// use wam_policy::LicenseProfile;
/// use wam_types::OutputTokens;
///
/// let profile: LicenseProfile = serde_json::from_str(
///     r#"{
///         "allowedOutputTokens": ["readonly", "annotation"],
///         "requiresAttribution": true,
///         "isCopyleft": false,
///         "commercialUse": true,
///         "shareAlike": false,
///         "licenseName": "Creative Commons Attribution-NoDerivatives 4.0 International"
///     }"#,
/// )
/// .expect("valid profile");
///
/// assert_eq!(
///     profile.allowed_output_tokens,
///     OutputTokens::READONLY | OutputTokens::ANNOTATION,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseProfile {
    /// The output ceiling. `["mutable"]` grants everything (the token
    /// implies the broadest capability); a narrower list caps derived use.
    pub allowed_output_tokens: OutputTokens,
    /// The license requires attribution of the source.
    pub requires_attribution: bool,
    /// Derived works must carry the same license.
    pub is_copyleft: bool,
    /// Commercial use is permitted.
    pub commercial_use: bool,
    /// Adaptations must be shared under compatible terms.
    pub share_alike: bool,
    /// Human-readable license name.
    pub license_name: String,
}

impl LicenseProfile {
    /// A full-rights profile: output ceiling `mutable`.
    #[must_use]
    pub fn permissive(
        license_name: &str,
        requires_attribution: bool,
        is_copyleft: bool,
        share_alike: bool,
    ) -> Self {
        Self {
            allowed_output_tokens: OutputTokens::MUTABLE,
            requires_attribution,
            is_copyleft,
            commercial_use: true,
            share_alike,
            license_name: license_name.to_string(),
        }
    }

    /// A restricted profile with an explicit output ceiling.
    #[must_use]
    pub fn restricted(
        license_name: &str,
        allowed_output_tokens: OutputTokens,
        requires_attribution: bool,
        commercial_use: bool,
    ) -> Self {
        Self {
            allowed_output_tokens,
            requires_attribution,
            is_copyleft: false,
            commercial_use,
            share_alike: false,
            license_name: license_name.to_string(),
        }
    }

    /// The most restrictive profile: readonly ceiling, no grants.
    ///
    /// This is the recommended fallback when a license identifier cannot be
    /// resolved — conservatism is the safe default on ambiguity.
    #[must_use]
    pub fn most_restrictive() -> Self {
        Self::restricted("All Rights Reserved", OutputTokens::READONLY, false, false)
    }
}

/// Queryable compliance facts attached to a resolved effective policy.
///
/// Facts never narrow tokens; they exist so downstream compliance reporting
/// can answer "does this use require attribution?" without a second registry
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseFacts {
    /// Canonical license identifier (aliases already resolved).
    pub license_id: String,
    /// Human-readable license name.
    pub license_name: String,
    /// The license requires attribution of the source.
    pub requires_attribution: bool,
    /// Derived works must carry the same license.
    pub is_copyleft: bool,
    /// Commercial use is permitted.
    pub commercial_use: bool,
    /// Adaptations must be shared under compatible terms.
    pub share_alike: bool,
    /// The declared identifier was unknown and the most restrictive profile
    /// was substituted.
    pub fallback: bool,
}

impl LicenseFacts {
    /// Builds facts from a resolved profile.
    #[must_use]
    pub fn from_profile(license_id: &str, profile: &LicenseProfile, fallback: bool) -> Self {
        Self {
            license_id: license_id.to_string(),
            license_name: profile.license_name.clone(),
            requires_attribution: profile.requires_attribution,
            is_copyleft: profile.is_copyleft,
            commercial_use: profile.commercial_use,
            share_alike: profile.share_alike,
            fallback,
        }
    }
}

/// The builtin SPDX profile set.
///
/// Covers the common public-domain, permissive, Creative Commons, copyleft,
/// and proprietary identifiers. Hosts with richer catalogs load their own
/// mapping; this set is enough for documents in the wild.
#[must_use]
pub fn builtin_profiles() -> Vec<(&'static str, LicenseProfile)> {
    use LicenseProfile as P;
    let nd_ceiling = OutputTokens::READONLY | OutputTokens::ANNOTATION;
    vec![
        // Public domain and permissive
        (
            "CC0-1.0",
            P::permissive("Creative Commons Zero v1.0 Universal", false, false, false),
        ),
        ("Unlicense", P::permissive("The Unlicense", false, false, false)),
        ("MIT", P::permissive("MIT License", true, false, false)),
        ("MIT-0", P::permissive("MIT No Attribution", false, false, false)),
        (
            "Apache-2.0",
            P::permissive("Apache License 2.0", true, false, false),
        ),
        (
            "BSD-2-Clause",
            P::permissive("BSD 2-Clause \"Simplified\" License", true, false, false),
        ),
        (
            "BSD-3-Clause",
            P::permissive(
                "BSD 3-Clause \"New\" or \"Revised\" License",
                true,
                false,
                false,
            ),
        ),
        ("ISC", P::permissive("ISC License", true, false, false)),
        // Creative Commons
        (
            "CC-BY-4.0",
            P::permissive(
                "Creative Commons Attribution 4.0 International",
                true,
                false,
                false,
            ),
        ),
        (
            "CC-BY-SA-4.0",
            P::permissive(
                "Creative Commons Attribution-ShareAlike 4.0 International",
                true,
                true,
                true,
            ),
        ),
        (
            "CC-BY-NC-4.0",
            P {
                commercial_use: false,
                ..P::permissive(
                    "Creative Commons Attribution-NonCommercial 4.0 International",
                    true,
                    false,
                    false,
                )
            },
        ),
        (
            "CC-BY-NC-SA-4.0",
            P {
                commercial_use: false,
                ..P::permissive(
                    "Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International",
                    true,
                    true,
                    true,
                )
            },
        ),
        (
            "CC-BY-ND-4.0",
            P::restricted(
                "Creative Commons Attribution-NoDerivatives 4.0 International",
                nd_ceiling,
                true,
                true,
            ),
        ),
        (
            "CC-BY-NC-ND-4.0",
            P::restricted(
                "Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International",
                nd_ceiling,
                true,
                false,
            ),
        ),
        // Copyleft
        (
            "GPL-2.0-only",
            P::permissive("GNU General Public License v2.0 only", true, true, true),
        ),
        (
            "GPL-3.0-only",
            P::permissive("GNU General Public License v3.0 only", true, true, true),
        ),
        (
            "GPL-3.0-or-later",
            P::permissive("GNU General Public License v3.0 or later", true, true, true),
        ),
        (
            "LGPL-3.0-only",
            P::permissive(
                "GNU Lesser General Public License v3.0 only",
                true,
                true,
                true,
            ),
        ),
        (
            "AGPL-3.0-only",
            P::permissive("GNU Affero General Public License v3.0", true, true, true),
        ),
        (
            "MPL-2.0",
            P::permissive("Mozilla Public License 2.0", true, true, false),
        ),
        // Proprietary
        (
            "proprietary",
            P::restricted("Proprietary", OutputTokens::READONLY, false, false),
        ),
        ("all-rights-reserved", P::most_restrictive()),
    ]
}

/// Legacy aliases for the builtin profile set.
#[must_use]
pub fn builtin_aliases() -> Vec<(&'static str, &'static str)> {
    vec![
        ("CC-BY-ND", "CC-BY-ND-4.0"),
        ("CC0", "CC0-1.0"),
        ("GPL-3.0", "GPL-3.0-only"),
    ]
}
