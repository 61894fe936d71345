//! The policy tree — arena-stored node hierarchy with generation tracking.
//!
//! Nodes live in a flat arena ([`NodeId`] is an index); child→parent links
//! are non-owning back-references used only for ancestry walks, while
//! ownership flows strictly root→children. This rules out ownership cycles
//! and lets the cascade fold over a parent-index path instead of recursing
//! through pointers.
//!
//! # Generations
//!
//! Two counters key the effective-policy cache:
//!
//! - every declaration-bearing mutation stamps the touched node with a fresh
//!   **declaration generation** from a tree-wide clock;
//! - **structure generation** moves on attach/detach/label edits, which is
//!   what the dependency-rule overlay keys on.
//!
//! A cached resolution records the full root→node path with each node's
//! declaration generation; any mutation on the path invalidates exactly the
//! affected subtree and nothing else.

use thiserror::Error;
use wam_types::{
    DiagnosticCode, Facet, FacetDecl, Importance, InputTokens, MemoryTokens, OutputTokens,
};
use wam_types::NodeId;

/// Errors raised by structural tree edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The id was not minted by this tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The edit would make a node its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    CycleDetected {
        /// The node being attached.
        child: NodeId,
        /// The prospective parent.
        parent: NodeId,
    },

    /// The root cannot be detached.
    #[error("cannot detach the root node {0}")]
    CannotDetachRoot(NodeId),

    /// The node is already attached to a parent.
    #[error("node {0} is already attached; detach it first")]
    AlreadyAttached(NodeId),
}

impl DiagnosticCode for TreeError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownNode(_) => "WAM_UNKNOWN_NODE",
            Self::CycleDetected { .. } => "WAM_TREE_CYCLE",
            Self::CannotDetachRoot(_) => "WAM_DETACH_ROOT",
            Self::AlreadyAttached(_) => "WAM_ALREADY_ATTACHED",
        }
    }

    fn is_fatal(&self) -> bool {
        true
    }
}

/// The policy-bearing payload of one markup element.
///
/// Everything here comes from the host's parser: facet declarations (parsed
/// from the element's policy attributes), the intent category and importance,
/// the license tag, and the selector labels the provided
/// [`LabelMatcher`](crate::LabelMatcher) matches against.
///
/// # Example
///
/// ```
/// use wam_engine::NodeData;
///
/// let data = NodeData::new()
///     .with_input_tokens(&["structure", "text"])
///     .with_category("quote")
///     .with_license("CC-BY-4.0")
///     .with_label(".pull-quote");
///
/// assert_eq!(data.category(), Some("quote"));
/// assert!(data.malformed().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    pub(crate) input: FacetDecl<InputTokens>,
    pub(crate) output: FacetDecl<OutputTokens>,
    pub(crate) memory: FacetDecl<MemoryTokens>,
    pub(crate) category: Option<String>,
    pub(crate) license: Option<String>,
    pub(crate) importance: Option<Importance>,
    pub(crate) labels: Vec<String>,
    /// Facet/token pairs from declarations that failed to parse; surfaced
    /// as malformed-declaration violations at resolution time.
    pub(crate) malformed: Vec<(Facet, String)>,
}

impl NodeData {
    /// Creates an undeclared node: every facet inherits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input declaration from an already-parsed value.
    #[must_use]
    pub fn with_input(mut self, decl: FacetDecl<InputTokens>) -> Self {
        self.input = decl;
        self
    }

    /// Sets the output declaration from an already-parsed value.
    #[must_use]
    pub fn with_output(mut self, decl: FacetDecl<OutputTokens>) -> Self {
        self.output = decl;
        self
    }

    /// Sets the memory declaration from an already-parsed value.
    #[must_use]
    pub fn with_memory(mut self, decl: FacetDecl<MemoryTokens>) -> Self {
        self.memory = decl;
        self
    }

    /// Parses and sets the input declaration from wire token names.
    ///
    /// Unknown tokens poison the declaration (it degrades to inherit) and
    /// are recorded for later reporting as malformed-declaration violations.
    #[must_use]
    pub fn with_input_tokens(mut self, tokens: &[&str]) -> Self {
        let parsed = FacetDecl::<InputTokens>::parse_tokens(tokens);
        self.input = parsed.value;
        self.record_malformed(Facet::Input, parsed.unknown);
        self
    }

    /// Parses and sets the output declaration from wire token names.
    #[must_use]
    pub fn with_output_tokens(mut self, tokens: &[&str]) -> Self {
        let parsed = FacetDecl::<OutputTokens>::parse_tokens(tokens);
        self.output = parsed.value;
        self.record_malformed(Facet::Output, parsed.unknown);
        self
    }

    /// Parses and sets the memory declaration from wire token names.
    #[must_use]
    pub fn with_memory_tokens(mut self, tokens: &[&str]) -> Self {
        let parsed = FacetDecl::<MemoryTokens>::parse_tokens(tokens);
        self.memory = parsed.value;
        self.record_malformed(Facet::Memory, parsed.unknown);
        self
    }

    /// Sets the intent category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the license identifier.
    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Sets the intent importance level.
    #[must_use]
    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Adds one selector label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Replaces the selector labels.
    #[must_use]
    pub fn with_labels<I, T>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    fn record_malformed(&mut self, facet: Facet, unknown: Vec<String>) {
        self.malformed.retain(|(f, _)| *f != facet);
        self.malformed
            .extend(unknown.into_iter().map(|token| (facet, token)));
    }

    /// The input declaration.
    #[must_use]
    pub fn input_declaration(&self) -> FacetDecl<InputTokens> {
        self.input
    }

    /// The output declaration.
    #[must_use]
    pub fn output_declaration(&self) -> FacetDecl<OutputTokens> {
        self.output
    }

    /// The memory declaration.
    #[must_use]
    pub fn memory_declaration(&self) -> FacetDecl<MemoryTokens> {
        self.memory
    }

    /// The intent category, if declared.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The license identifier, if declared.
    #[must_use]
    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    /// The intent importance, if declared.
    #[must_use]
    pub fn importance(&self) -> Option<Importance> {
        self.importance
    }

    /// The selector labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Facet/token pairs from declarations that failed to parse.
    #[must_use]
    pub fn malformed(&self) -> &[(Facet, String)] {
        &self.malformed
    }
}

/// A borrowed view of one node, handed to selector matchers.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    /// The node's id.
    pub id: NodeId,
    data: &'a NodeData,
}

impl<'a> NodeRef<'a> {
    /// The node's payload.
    #[must_use]
    pub fn data(&self) -> &'a NodeData {
        self.data
    }

    /// The node's selector labels.
    #[must_use]
    pub fn labels(&self) -> &'a [String] {
        &self.data.labels
    }

    /// The node's intent category, if declared.
    #[must_use]
    pub fn category(&self) -> Option<&'a str> {
        self.data.category.as_deref()
    }
}

struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    decl_gen: u64,
}

/// The node hierarchy of one document.
///
/// # Example
///
/// ```
/// use wam_engine::{NodeData, PolicyTree};
///
/// let mut tree = PolicyTree::new(NodeData::new().with_input_tokens(&["text"]));
/// let root = tree.root();
/// let child = tree
///     .add_child(root, NodeData::new().with_category("quote"))
///     .expect("root exists");
///
/// assert_eq!(tree.parent(child), Some(root));
/// assert_eq!(tree.children(root), [child]);
/// assert_eq!(tree.path_from_root(child), Some(vec![root, child]));
/// ```
pub struct PolicyTree {
    slots: Vec<Slot>,
    root: NodeId,
    /// Tree-wide declaration clock; every mutation takes the next tick.
    clock: u64,
    structure_gen: u64,
}

impl PolicyTree {
    /// Creates a tree with the given root payload.
    #[must_use]
    pub fn new(root_data: NodeData) -> Self {
        Self {
            slots: vec![Slot {
                data: root_data,
                parent: None,
                children: Vec::new(),
                decl_gen: 0,
            }],
            root: NodeId::from_index(0),
            clock: 0,
            structure_gen: 0,
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena (attached or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if the id was minted by this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.slots.len()
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.index())
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot, TreeError> {
        self.slots
            .get_mut(id.index())
            .ok_or(TreeError::UnknownNode(id))
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Appends a child under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if `parent` is not in this tree.
    pub fn add_child(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId, TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        let id = NodeId::from_index(self.slots.len());
        let decl_gen = self.tick();
        self.slots.push(Slot {
            data,
            parent: Some(parent),
            children: Vec::new(),
            decl_gen,
        });
        self.slots[parent.index()].children.push(id);
        self.structure_gen += 1;
        Ok(id)
    }

    /// The node's payload, if the id is known.
    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.slot(id).map(|slot| &slot.data)
    }

    /// A borrowed view for selector matching.
    #[must_use]
    pub fn node_ref(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.slot(id).map(|slot| NodeRef {
            id,
            data: &slot.data,
        })
    }

    /// The node's parent (`None` for the root, detached nodes, and unknown
    /// ids).
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|slot| slot.parent)
    }

    /// The node's children, in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map_or(&[], |slot| &slot.children)
    }

    /// The node's declaration generation.
    #[must_use]
    pub fn decl_generation(&self, id: NodeId) -> Option<u64> {
        self.slot(id).map(|slot| slot.decl_gen)
    }

    /// The structure generation (moves on attach/detach/label edits).
    #[must_use]
    pub fn structure_generation(&self) -> u64 {
        self.structure_gen
    }

    /// The ancestry path root→node, including `id` itself.
    ///
    /// For a detached node the path starts at its subtree's top. Returns
    /// `None` for ids this tree did not mint.
    #[must_use]
    pub fn path_from_root(&self, id: NodeId) -> Option<Vec<NodeId>> {
        if !self.contains(id) {
            return None;
        }
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
            // parent links cannot cycle (attach() refuses cycles), so the
            // walk is bounded by the arena size
            if path.len() > self.slots.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }

    /// All nodes reachable from the root, in preorder.
    ///
    /// Detached subtrees are not part of the document and are excluded.
    #[must_use]
    pub fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.slots.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            // reversed so the leftmost child is visited first
            for &child in self.children(id).iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// All descendants of `id` (excluding `id`), in preorder.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        while let Some(node) = stack.pop() {
            order.push(node);
            for &child in self.children(node).iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Replaces the input declaration.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn set_input_declaration(
        &mut self,
        id: NodeId,
        decl: FacetDecl<InputTokens>,
    ) -> Result<(), TreeError> {
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.input = decl;
        slot.decl_gen = gen;
        Ok(())
    }

    /// Replaces the output declaration.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn set_output_declaration(
        &mut self,
        id: NodeId,
        decl: FacetDecl<OutputTokens>,
    ) -> Result<(), TreeError> {
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.output = decl;
        slot.decl_gen = gen;
        Ok(())
    }

    /// Replaces the memory declaration.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn set_memory_declaration(
        &mut self,
        id: NodeId,
        decl: FacetDecl<MemoryTokens>,
    ) -> Result<(), TreeError> {
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.memory = decl;
        slot.decl_gen = gen;
        Ok(())
    }

    /// Parses and replaces the input declaration from wire token names,
    /// recording malformed tokens.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn declare_input(&mut self, id: NodeId, tokens: &[&str]) -> Result<(), TreeError> {
        let parsed = FacetDecl::<InputTokens>::parse_tokens(tokens);
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.input = parsed.value;
        slot.data.record_malformed(Facet::Input, parsed.unknown);
        slot.decl_gen = gen;
        Ok(())
    }

    /// Parses and replaces the output declaration from wire token names,
    /// recording malformed tokens.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn declare_output(&mut self, id: NodeId, tokens: &[&str]) -> Result<(), TreeError> {
        let parsed = FacetDecl::<OutputTokens>::parse_tokens(tokens);
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.output = parsed.value;
        slot.data.record_malformed(Facet::Output, parsed.unknown);
        slot.decl_gen = gen;
        Ok(())
    }

    /// Parses and replaces the memory declaration from wire token names,
    /// recording malformed tokens.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn declare_memory(&mut self, id: NodeId, tokens: &[&str]) -> Result<(), TreeError> {
        let parsed = FacetDecl::<MemoryTokens>::parse_tokens(tokens);
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.memory = parsed.value;
        slot.data.record_malformed(Facet::Memory, parsed.unknown);
        slot.decl_gen = gen;
        Ok(())
    }

    /// Sets or clears the intent category.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn set_category(&mut self, id: NodeId, category: Option<String>) -> Result<(), TreeError> {
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.category = category;
        slot.decl_gen = gen;
        Ok(())
    }

    /// Sets or clears the license identifier.
    ///
    /// The license tag governs the node and its whole subtree (nearest
    /// ancestor-or-self wins), so this invalidates cached resolutions for
    /// every descendant.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn set_license(&mut self, id: NodeId, license: Option<String>) -> Result<(), TreeError> {
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.license = license;
        slot.decl_gen = gen;
        Ok(())
    }

    /// Sets or clears the intent importance.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn set_importance(
        &mut self,
        id: NodeId,
        importance: Option<Importance>,
    ) -> Result<(), TreeError> {
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.importance = importance;
        slot.decl_gen = gen;
        Ok(())
    }

    /// Replaces the selector labels.
    ///
    /// Labels drive block-selector and dependency matching, so this counts
    /// as a structural edit.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a foreign id.
    pub fn set_labels<I, T>(&mut self, id: NodeId, labels: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let gen = self.tick();
        let slot = self.slot_mut(id)?;
        slot.data.labels = labels.into_iter().map(Into::into).collect();
        slot.decl_gen = gen;
        self.structure_gen += 1;
        Ok(())
    }

    /// Detaches a node (and its subtree) from its parent.
    ///
    /// The subtree stays in the arena and keeps its internal structure; it
    /// is simply no longer part of the document until re-[`attach`]ed.
    ///
    /// [`attach`]: Self::attach
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::CannotDetachRoot`] for the root and
    /// [`TreeError::UnknownNode`] for a foreign id.
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::CannotDetachRoot(id));
        }
        let parent = self
            .slot(id)
            .ok_or(TreeError::UnknownNode(id))?
            .parent;
        if let Some(parent) = parent {
            self.slots[parent.index()].children.retain(|&c| c != id);
            self.slots[id.index()].parent = None;
            self.structure_gen += 1;
        }
        Ok(())
    }

    /// Attaches a previously detached node under `parent`.
    ///
    /// # Errors
    ///
    /// - [`TreeError::AlreadyAttached`] if the node has a parent (or is the
    ///   root);
    /// - [`TreeError::CycleDetected`] if `parent` lies inside the node's own
    ///   subtree;
    /// - [`TreeError::UnknownNode`] for foreign ids.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        let child_slot = self.slot(child).ok_or(TreeError::UnknownNode(child))?;
        if child == self.root || child_slot.parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        // reject if `parent` is inside the subtree being attached
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(TreeError::CycleDetected { child, parent });
            }
            cursor = self.parent(node);
        }
        self.slots[child.index()].parent = Some(parent);
        self.slots[parent.index()].children.push(child);
        self.structure_gen += 1;
        Ok(())
    }
}
