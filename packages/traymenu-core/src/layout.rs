use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::props::PropValue;

/// One node of a layout snapshot: identity, filtered properties, and child
/// snapshots in display order. The whole snapshot is consistent with a
/// single point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Layout {
    pub id: NodeId,
    pub properties: BTreeMap<String, PropValue>,
    pub children: Vec<Layout>,
}

impl Layout {
    /// Total number of nodes in the snapshot, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Layout::node_count).sum::<usize>()
    }

    /// Depth-first lookup by identity.
    pub fn find(&self, id: NodeId) -> Option<&Layout> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// Reply entry of a group property query.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeProps {
    pub id: NodeId,
    pub properties: BTreeMap<String, PropValue>,
}
