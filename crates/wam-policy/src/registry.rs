//! License registry — canonical profiles with alias resolution.
//!
//! The registry maps license identifiers (case-sensitive canonical form) to
//! [`LicenseProfile`]s. Aliases resolve to a canonical entry at lookup time
//! and are never duplicated in storage. After initialization the registry is
//! read-only state; [`reload`](LicenseRegistry::reload) swaps the whole
//! mapping atomically (all-or-nothing) and bumps a generation counter that
//! resolution caches key on.

use crate::license::{builtin_aliases, builtin_profiles, LicenseProfile};
use std::collections::HashMap;
use thiserror::Error;
use wam_types::DiagnosticCode;

/// Errors raised by registry construction and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The identifier matches neither a canonical profile nor an alias.
    ///
    /// Recoverable: the resolution pipeline substitutes the most restrictive
    /// profile and keeps going.
    #[error("unknown license identifier '{id}'")]
    UnknownLicense {
        /// The identifier that failed to resolve.
        id: String,
    },

    /// An alias points at a canonical identifier that is not in the mapping.
    ///
    /// Raised during construction or reload; the offending mapping is
    /// rejected as a whole and any previous state is kept.
    #[error("alias '{alias}' points at unknown license '{target}'")]
    DanglingAlias {
        /// The alias being defined.
        alias: String,
        /// The missing canonical identifier it points at.
        target: String,
    },
}

impl DiagnosticCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownLicense { .. } => "WAM_UNKNOWN_LICENSE",
            Self::DanglingAlias { .. } => "WAM_DANGLING_ALIAS",
        }
    }

    fn is_fatal(&self) -> bool {
        match self {
            // Lookup falls back to the most restrictive profile.
            Self::UnknownLicense { .. } => false,
            // The reload is rejected; previous state stays in force.
            Self::DanglingAlias { .. } => true,
        }
    }
}

/// Process-wide read-only license state with atomic reload.
///
/// # Concurrency
///
/// Queries take `&self`; `reload` takes `&mut self` and is the only
/// mutation. Embedders that share a registry across threads wrap it the way
/// the engine does (behind the engine's own synchronization) — the registry
/// itself holds no locks.
///
/// # Example
///
/// ```
/// use wam_policy::LicenseRegistry;
///
/// let registry = LicenseRegistry::builtin();
///
/// // Aliases resolve at lookup time.
/// let (canonical, profile) = registry.resolve("GPL-3.0").expect("known alias");
/// assert_eq!(canonical, "GPL-3.0-only");
/// assert!(profile.is_copyleft);
///
/// assert!(registry.resolve("not-a-license").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LicenseRegistry {
    profiles: HashMap<String, LicenseProfile>,
    aliases: HashMap<String, String>,
    generation: u64,
}

impl LicenseRegistry {
    /// Builds a registry from canonical profiles and aliases.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DanglingAlias`] if any alias points at an
    /// identifier with no canonical profile. Nothing is kept on error.
    pub fn new(
        profiles: impl IntoIterator<Item = (String, LicenseProfile)>,
        aliases: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, RegistryError> {
        let profiles: HashMap<String, LicenseProfile> = profiles.into_iter().collect();
        let aliases: HashMap<String, String> = aliases.into_iter().collect();
        validate_aliases(&profiles, &aliases)?;
        Ok(Self {
            profiles,
            aliases,
            generation: 0,
        })
    }

    /// Builds the registry with the builtin SPDX profile set and its legacy
    /// aliases.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            profiles: builtin_profiles()
                .into_iter()
                .map(|(id, profile)| (id.to_string(), profile))
                .collect(),
            aliases: builtin_aliases()
                .into_iter()
                .map(|(alias, target)| (alias.to_string(), target.to_string()))
                .collect(),
            generation: 0,
        }
    }

    /// Resolves an identifier to its canonical id and profile.
    ///
    /// Canonical ids win over aliases of the same spelling. Matching is
    /// case-sensitive: `"mit"` does not resolve to `"MIT"`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownLicense`] when neither a canonical
    /// profile nor an alias matches.
    pub fn resolve(&self, id: &str) -> Result<(&str, &LicenseProfile), RegistryError> {
        if let Some((canonical, profile)) = self.profiles.get_key_value(id) {
            return Ok((canonical.as_str(), profile));
        }
        if let Some(target) = self.aliases.get(id) {
            if let Some((canonical, profile)) = self.profiles.get_key_value(target.as_str()) {
                return Ok((canonical.as_str(), profile));
            }
        }
        Err(RegistryError::UnknownLicense { id: id.to_string() })
    }

    /// Returns the canonical identifier for `id`, if known.
    #[must_use]
    pub fn canonical_id(&self, id: &str) -> Option<&str> {
        self.resolve(id).ok().map(|(canonical, _)| canonical)
    }

    /// Returns `true` if `id` resolves (canonically or via alias).
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.resolve(id).is_ok()
    }

    /// The most restrictive profile, used as the unknown-identifier
    /// fallback.
    ///
    /// Prefers the registry's own `all-rights-reserved` entry so that hosts
    /// can tune the fallback; degrades to the builtin readonly profile when
    /// a custom mapping omits it.
    #[must_use]
    pub fn most_restrictive(&self) -> (&'static str, LicenseProfile) {
        match self.profiles.get("all-rights-reserved") {
            Some(profile) => ("all-rights-reserved", profile.clone()),
            None => ("all-rights-reserved", LicenseProfile::most_restrictive()),
        }
    }

    /// Replaces the whole mapping atomically.
    ///
    /// Validation happens against the incoming mapping before anything is
    /// swapped; on error the previous state stays in force and the
    /// generation does not move. On success the generation increments,
    /// invalidating every cached resolution that depended on license state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DanglingAlias`] for an alias whose target is
    /// missing from the incoming profiles.
    pub fn reload(
        &mut self,
        profiles: impl IntoIterator<Item = (String, LicenseProfile)>,
        aliases: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), RegistryError> {
        let profiles: HashMap<String, LicenseProfile> = profiles.into_iter().collect();
        let aliases: HashMap<String, String> = aliases.into_iter().collect();
        validate_aliases(&profiles, &aliases)?;

        self.profiles = profiles;
        self.aliases = aliases;
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            profiles = self.profiles.len(),
            aliases = self.aliases.len(),
            "license registry reloaded"
        );
        Ok(())
    }

    /// Monotonically increasing reload generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of canonical profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns `true` if no profiles are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for LicenseRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_aliases(
    profiles: &HashMap<String, LicenseProfile>,
    aliases: &HashMap<String, String>,
) -> Result<(), RegistryError> {
    for (alias, target) in aliases {
        if !profiles.contains_key(target.as_str()) {
            return Err(RegistryError::DanglingAlias {
                alias: alias.clone(),
                target: target.clone(),
            });
        }
        if profiles.contains_key(alias.as_str()) {
            // Canonical entries win over aliases of the same spelling.
            tracing::warn!(alias = %alias, "alias shadowed by canonical profile");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wam_types::{assert_diagnostic_code, OutputTokens};

    #[test]
    fn builtin_resolves_canonical_ids() {
        let registry = LicenseRegistry::builtin();
        let (id, profile) = registry.resolve("MIT").expect("known license");
        assert_eq!(id, "MIT");
        assert_eq!(profile.allowed_output_tokens, OutputTokens::MUTABLE);
    }

    #[test]
    fn aliases_resolve_to_canonical_entries() {
        let registry = LicenseRegistry::builtin();

        let (id, _) = registry.resolve("CC0").expect("alias");
        assert_eq!(id, "CC0-1.0");
        let (id, _) = registry.resolve("CC-BY-ND").expect("alias");
        assert_eq!(id, "CC-BY-ND-4.0");
        let (id, _) = registry.resolve("GPL-3.0").expect("alias");
        assert_eq!(id, "GPL-3.0-only");

        assert_eq!(registry.canonical_id("CC0"), Some("CC0-1.0"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = LicenseRegistry::builtin();
        assert!(registry.contains("MIT"));
        assert!(!registry.contains("mit"));
    }

    #[test]
    fn unknown_license_error() {
        let registry = LicenseRegistry::builtin();
        let err = registry.resolve("not-a-license").expect_err("unknown");
        assert_eq!(
            err,
            RegistryError::UnknownLicense {
                id: "not-a-license".to_string()
            }
        );
        assert_eq!(err.code(), "WAM_UNKNOWN_LICENSE");
        assert!(!err.is_fatal());
        assert_diagnostic_code(&err);
    }

    #[test]
    fn dangling_alias_rejected_at_construction() {
        let err = LicenseRegistry::new(
            vec![("MIT".to_string(), LicenseProfile::most_restrictive())],
            vec![("X".to_string(), "missing".to_string())],
        )
        .expect_err("dangling alias");
        assert_eq!(err.code(), "WAM_DANGLING_ALIAS");
        assert!(err.is_fatal());
    }

    #[test]
    fn reload_is_all_or_nothing() {
        let mut registry = LicenseRegistry::builtin();
        let before_len = registry.len();

        let err = registry.reload(
            vec![("ONLY".to_string(), LicenseProfile::most_restrictive())],
            vec![("A".to_string(), "missing".to_string())],
        );
        assert!(err.is_err());

        // previous state kept, generation unchanged
        assert_eq!(registry.len(), before_len);
        assert_eq!(registry.generation(), 0);
        assert!(registry.contains("MIT"));
    }

    #[test]
    fn reload_swaps_and_bumps_generation() {
        let mut registry = LicenseRegistry::builtin();
        registry
            .reload(
                vec![(
                    "CUSTOM-1.0".to_string(),
                    LicenseProfile::permissive("Custom", false, false, false),
                )],
                vec![("CUSTOM".to_string(), "CUSTOM-1.0".to_string())],
            )
            .expect("valid reload");

        assert_eq!(registry.generation(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("CUSTOM"));
        assert!(!registry.contains("MIT"));
    }

    #[test]
    fn most_restrictive_prefers_registry_entry() {
        let registry = LicenseRegistry::builtin();
        let (id, profile) = registry.most_restrictive();
        assert_eq!(id, "all-rights-reserved");
        assert_eq!(profile.allowed_output_tokens, OutputTokens::READONLY);

        // Falls back to the builtin constant when the entry is absent.
        let custom = LicenseRegistry::new(
            vec![(
                "MIT".to_string(),
                LicenseProfile::permissive("MIT License", true, false, false),
            )],
            Vec::<(String, String)>::new(),
        )
        .expect("valid registry");
        let (_, profile) = custom.most_restrictive();
        assert_eq!(profile.allowed_output_tokens, OutputTokens::READONLY);
    }

    #[test]
    fn canonical_wins_over_alias_of_same_spelling() {
        let registry = LicenseRegistry::new(
            vec![
                (
                    "A".to_string(),
                    LicenseProfile::permissive("A", false, false, false),
                ),
                ("B".to_string(), LicenseProfile::most_restrictive()),
            ],
            vec![("A".to_string(), "B".to_string())],
        )
        .expect("valid registry");

        let (id, profile) = registry.resolve("A").expect("resolves");
        assert_eq!(id, "A");
        assert_eq!(profile.allowed_output_tokens, OutputTokens::MUTABLE);
    }
}
