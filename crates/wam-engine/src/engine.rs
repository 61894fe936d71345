//! The resolution engine facade.
//!
//! Owns the policy tree, the versioned document policy and license registry,
//! the selector matcher, the effective-policy cache, and the dependency
//! overlay. Data flows one direction per query:
//!
//! ```text
//! PolicyTree → cascade → constraints → compliance → EffectivePolicy
//!                  ▲                                      │
//!          dependency overlay                      cache (Arc snapshot)
//!                                                         │
//!                                              check_mutation / queries
//! ```
//!
//! # Concurrency
//!
//! Queries take `&self` and may run concurrently: cache and overlay sit
//! behind read-mostly locks and every published result is an immutable
//! `Arc` snapshot. Writers take `&mut self`, which statically excludes
//! racing a reader in the same engine; each write bumps the generation the
//! affected state is keyed on, so the next query re-validates.

use parking_lot::{RwLock, RwLockWriteGuard};
use std::sync::Arc;
use wam_policy::{GlobalPolicy, LicenseProfile, LicenseRegistry, RegistryError};
use wam_types::{NodeId, OutputTokens, ProvenanceLayer, Violation};

use crate::cache::{CacheKey, CacheStats, EffectiveCache};
use crate::cascade;
use crate::compliance;
use crate::constraints;
use crate::dependency::{self, DependencyOverlay};
use crate::effective::EffectivePolicy;
use crate::selector::{LabelMatcher, SelectorMatch};
use crate::tree::PolicyTree;

/// Resolves effective per-node permissions for one document.
///
/// # Example
///
/// ```
/// use wam_engine::{NodeData, PolicyEngine, PolicyTree};
/// use wam_types::OutputTokens;
///
/// let mut tree = PolicyTree::new(NodeData::new());
/// let child = tree
///     .add_child(tree.root(), NodeData::new().with_license("CC-BY-ND-4.0"))
///     .expect("root exists");
///
/// let engine = PolicyEngine::new(tree);
/// let policy = engine.get_effective(child);
///
/// // default output (readonly) ∩ no-derivatives ceiling = readonly
/// assert_eq!(policy.output, OutputTokens::READONLY);
/// assert!(engine.check_mutation(child, OutputTokens::CONTENT).is_some());
/// assert!(engine.check_mutation(child, OutputTokens::READONLY).is_none());
/// ```
pub struct PolicyEngine {
    tree: PolicyTree,
    global: GlobalPolicy,
    global_gen: u64,
    registry: LicenseRegistry,
    matcher: Box<dyn SelectorMatch>,
    cache: EffectiveCache,
    overlay: RwLock<DependencyOverlay>,
}

impl PolicyEngine {
    /// Creates an engine over `tree` with an all-defaults document policy,
    /// the builtin license registry, and label-based selector matching.
    #[must_use]
    pub fn new(tree: PolicyTree) -> Self {
        Self {
            tree,
            global: GlobalPolicy::default(),
            global_gen: 0,
            registry: LicenseRegistry::builtin(),
            matcher: Box::new(LabelMatcher),
            cache: EffectiveCache::new(),
            overlay: RwLock::new(DependencyOverlay::empty()),
        }
    }

    /// Sets the document-wide policy (builder form).
    #[must_use]
    pub fn with_global(mut self, global: GlobalPolicy) -> Self {
        self.global = global;
        // also counts as a replacement when used mid-lifetime
        self.global_gen += 1;
        self
    }

    /// Sets the license registry (builder form).
    #[must_use]
    pub fn with_registry(mut self, registry: LicenseRegistry) -> Self {
        self.registry = registry;
        // a fresh registry restarts its own generation; moving the global
        // generation keeps earlier cache entries from matching
        self.global_gen += 1;
        self
    }

    /// Sets the selector matcher (builder form).
    #[must_use]
    pub fn with_matcher(mut self, matcher: impl SelectorMatch + 'static) -> Self {
        self.matcher = Box::new(matcher);
        // matcher answers feed block-selector and dependency matching
        self.global_gen += 1;
        self
    }

    /// The policy tree.
    #[must_use]
    pub fn tree(&self) -> &PolicyTree {
        &self.tree
    }

    /// Mutable access to the policy tree.
    ///
    /// Tree mutators bump the generations the cache keys on, so edits made
    /// through this handle invalidate exactly the affected subtree.
    pub fn tree_mut(&mut self) -> &mut PolicyTree {
        &mut self.tree
    }

    /// The document-wide policy.
    #[must_use]
    pub fn global(&self) -> &GlobalPolicy {
        &self.global
    }

    /// The license registry.
    #[must_use]
    pub fn registry(&self) -> &LicenseRegistry {
        &self.registry
    }

    /// Replaces the document-wide policy.
    ///
    /// Bumps the global generation: every cached resolution is re-validated
    /// on its next query.
    pub fn replace_global(&mut self, global: GlobalPolicy) {
        self.global = global;
        self.global_gen += 1;
        tracing::debug!(generation = self.global_gen, "global policy replaced");
    }

    /// Reloads the license registry atomically (all-or-nothing).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DanglingAlias`] for an invalid mapping; the
    /// previous registry stays in force and no cache entry is invalidated.
    pub fn reload_licenses(
        &mut self,
        profiles: impl IntoIterator<Item = (String, LicenseProfile)>,
        aliases: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), RegistryError> {
        self.registry.reload(profiles, aliases)
    }

    /// Resolves the effective policy for `node`, memoized.
    ///
    /// Never fails: a well-formed, maximally conservative policy comes back
    /// even for partially invalid inputs. An id this tree did not mint
    /// resolves to [`EffectivePolicy::conservative`].
    #[must_use]
    pub fn get_effective(&self, node: NodeId) -> Arc<EffectivePolicy> {
        let Some(path) = self.tree.path_from_root(node) else {
            tracing::error!(node = %node, "effective policy queried for a foreign node id");
            return Arc::new(EffectivePolicy::conservative());
        };

        self.with_overlay(|overlay| {
            let key = CacheKey {
                path: path
                    .iter()
                    .map(|&id| (id, self.tree.decl_generation(id).unwrap_or(0)))
                    .collect(),
                global_gen: self.global_gen,
                registry_gen: self.registry.generation(),
                overlay_gen: overlay.generation,
            };
            if let Some(hit) = self.cache.lookup(node, &key) {
                return hit;
            }

            let Some(node_ref) = self.tree.node_ref(node) else {
                return Arc::new(EffectivePolicy::conservative());
            };

            let inherited = cascade::resolve_inherited(
                &self.tree,
                &path,
                &self.global.defaults,
                &overlay.suppressed,
            );
            let constrained = constraints::apply_constraints(
                node_ref,
                &inherited,
                &self.global,
                self.matcher.as_ref(),
            );
            let compliance = compliance::check_license(
                node,
                constrained.output,
                inherited.output_explicit,
                inherited.license.as_deref(),
                &self.registry,
            );

            let mut violations: Vec<Violation> = node_ref
                .data()
                .malformed()
                .iter()
                .map(|(facet, token)| Violation::MalformedDeclaration {
                    node,
                    facet: *facet,
                    token: token.clone(),
                })
                .collect();
            violations.extend(
                overlay
                    .violations
                    .iter()
                    .filter(|violation| violation.node() == node)
                    .cloned(),
            );
            violations.extend(compliance.violations);

            let policy = Arc::new(EffectivePolicy {
                input: constrained.input,
                output: compliance.output.normalized(),
                memory: constrained.memory,
                license: compliance.facts,
                violations,
            });
            tracing::debug!(
                node = %node,
                input = %policy.input,
                output = %policy.output,
                memory = %policy.memory,
                violations = policy.violations.len(),
                "effective policy computed"
            );
            self.cache.insert(node, key, Arc::clone(&policy));
            policy
        })
    }

    /// Checks whether a mutation carrying `requested` output tokens is
    /// permitted on `node`.
    ///
    /// Returns `None` when permitted, or the denial otherwise. This is the
    /// single enforcement checkpoint for mutation attempts: a pure read of
    /// the cached policy with no side effects.
    #[must_use]
    pub fn check_mutation(&self, node: NodeId, requested: OutputTokens) -> Option<Violation> {
        let effective = self.get_effective(node);
        if effective.permits(requested) {
            tracing::debug!(node = %node, requested = %requested, "mutation permitted");
            None
        } else {
            let violation = Violation::MutationDenied {
                node,
                requested,
                available: effective.output,
            };
            tracing::warn!(
                node = %node,
                requested = %requested,
                available = %effective.output,
                "mutation denied"
            );
            Some(violation)
        }
    }

    /// Checks whether mutating the given provenance layer is permitted on
    /// `node`.
    ///
    /// Convenience over [`check_mutation`](Self::check_mutation) using the
    /// layer's gating output token.
    #[must_use]
    pub fn check_layer_mutation(
        &self,
        node: NodeId,
        layer: ProvenanceLayer,
    ) -> Option<Violation> {
        self.check_mutation(node, layer.required_output())
    }

    /// All dependency violations from the current batch pass, in rule
    /// order.
    #[must_use]
    pub fn dependency_violations(&self) -> Vec<Violation> {
        self.with_overlay(|overlay| overlay.violations.clone())
    }

    /// Cache hit/miss counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Runs `f` against a current dependency overlay, recomputing the batch
    /// pass first if the tree structure or global policy moved since the
    /// last one.
    fn with_overlay<R>(&self, f: impl FnOnce(&DependencyOverlay) -> R) -> R {
        let structure_gen = self.tree.structure_generation();
        let global_gen = self.global_gen;
        {
            let overlay = self.overlay.read();
            if !overlay.stale(structure_gen, global_gen) {
                return f(&overlay);
            }
        }

        let mut overlay = self.overlay.write();
        // another writer may have refreshed it while we waited
        if overlay.stale(structure_gen, global_gen) {
            let (suppressed, violations) = dependency::evaluate(
                &self.tree,
                &self.global.constraints.dependencies,
                self.matcher.as_ref(),
            );
            tracing::debug!(
                suppressed = suppressed.len(),
                violations = violations.len(),
                "dependency overlay recomputed"
            );
            *overlay = DependencyOverlay {
                suppressed,
                violations,
                structure_gen,
                global_gen,
                generation: overlay.generation + 1,
            };
        }
        let overlay = RwLockWriteGuard::downgrade(overlay);
        f(&overlay)
    }
}
