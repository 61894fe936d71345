//! Document-level policy inputs for the WAM policy engine.
//!
//! Two kinds of process-wide, read-mostly state live here:
//!
//! - [`GlobalPolicy`] — the document-wide defaults and constraints
//!   (block-selectors, category rules, dependency rules) that scope every
//!   per-node resolution.
//! - [`LicenseRegistry`] — license identifier → [`LicenseProfile`] mapping
//!   with alias resolution and atomic reload.
//!
//! Both are plain values the engine versions with generation counters; they
//! carry no interior mutability and no ambient global state, so independent
//! documents and tests run with independent policies.
//!
//! # Crate Architecture
//!
//! ```text
//! wam-types   (tokens, declarations, diagnostics)
//!     ↑
//! wam-policy  (GlobalPolicy, LicenseRegistry)  ◄── THIS CRATE
//!     ↑
//! wam-engine  (tree, cascade, constraints, cache)
//! ```

mod global;
mod license;
mod registry;

pub use global::{
    CategoryOverride, CategoryRule, DependencyRule, DependencyScope, FailureMode, GlobalPolicy,
    PolicyConstraints, PolicyDefaults,
};
pub use license::{builtin_aliases, builtin_profiles, LicenseFacts, LicenseProfile};
pub use registry::{LicenseRegistry, RegistryError};

#[cfg(test)]
mod tests {
    use super::*;
    use wam_types::OutputTokens;

    #[test]
    fn registry_and_policy_compose() {
        let registry = LicenseRegistry::builtin();
        let policy = GlobalPolicy::default();

        // The default output ceiling intersected with a no-derivatives
        // license is still readonly.
        let (_, profile) = registry.resolve("CC-BY-ND-4.0").expect("known license");
        let narrowed = policy.defaults.output.limited_to(profile.allowed_output_tokens);
        assert_eq!(narrowed, OutputTokens::READONLY);
    }
}
