//! Node identifiers.
//!
//! Nodes live in a flat arena inside the policy tree; a [`NodeId`] is an
//! index into that arena, not a network-visible identity. Ids are minted by
//! the tree that owns the node and are only meaningful against that tree.

use serde::{Deserialize, Serialize};

/// Identifier for one node in a policy tree.
///
/// An arena index: cheap to copy, hash, and compare. Ids are stable for the
/// lifetime of the tree that minted them (nodes are never compacted out of
/// the arena), so they are safe to hold across mutations.
///
/// # Example
///
/// ```
/// use wam_types::NodeId;
///
/// let id = NodeId::from_index(3);
/// assert_eq!(id.index(), 3);
/// assert_eq!(id.to_string(), "node:3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates an id from a raw arena index.
    ///
    /// Meaningful ids come from the tree that owns the arena; a fabricated
    /// id is simply unknown to every tree that did not mint it.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the raw arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node:{}", self.0)
    }
}
