use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Monotonic freshness token covering the whole tree. Remote observers use it
/// only for ordering; it restarts with the process and has no other meaning.
pub type Revision = u32;

/// Recursion depth requesting an unbounded layout walk.
pub const DEPTH_UNLIMITED: i32 = -1;

/// Identifier of a node within one menu tree.
///
/// Identities are allocated by the owning tree, increase monotonically, and
/// are never reused even after removal. `ROOT` is a distinguished sentinel
/// for the tree root, which is a pseudo-node and not part of the node map.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub i32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
