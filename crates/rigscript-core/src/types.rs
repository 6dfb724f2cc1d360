//! Common types used across rigscript

use serde::{Deserialize, Serialize};

/// Stable handle of a scene node inside the node arena
///
/// Node identity is always compared through this key, never by name, so two
/// nodes sharing a name stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Create a new node ID
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index of the node
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}
