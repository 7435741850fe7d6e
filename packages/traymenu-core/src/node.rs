use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::event::EventHandler;
use crate::ids::NodeId;
use crate::props::{keys, PropValue, PropertyBag};

/// One element of the menu hierarchy. Nodes are created and mutated only
/// through the owning tree; the tree-wide lock is always taken before a
/// node's own lock.
pub(crate) struct MenuNode {
    pub(crate) id: NodeId,
    state: RwLock<NodeState>,
}

impl MenuNode {
    pub(crate) fn new(id: NodeId, state: NodeState) -> Self {
        Self {
            id,
            state: RwLock::new(state),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, NodeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, NodeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) struct NodeState {
    pub(crate) parent: NodeId,
    pub(crate) props: PropertyBag,
    pub(crate) children: Vec<NodeId>,
    pub(crate) handler: Option<EventHandler>,
}

impl NodeState {
    pub(crate) fn new(parent: NodeId) -> Self {
        Self {
            parent,
            props: PropertyBag::new(),
            children: Vec::new(),
            handler: None,
        }
    }

    /// Replaces the child order. The derived submenu display hint is kept in
    /// sync within the same mutation: set when the first child arrives,
    /// cleared when the last one leaves.
    pub(crate) fn set_children(&mut self, children: Vec<NodeId>) {
        self.children = children;
        let display = if self.children.is_empty() { "" } else { "submenu" };
        self.props.set(keys::CHILDREN_DISPLAY, PropValue::text(display));
    }

    /// Applies property entries and returns the keys whose stored value
    /// actually changed, in first-write order without duplicates.
    pub(crate) fn apply_props(
        &mut self,
        entries: impl IntoIterator<Item = (String, PropValue)>,
    ) -> Vec<String> {
        let mut dirty = Vec::new();
        for (key, value) in entries {
            if self.props.set(key.clone(), value) && !dirty.contains(&key) {
                dirty.push(key);
            }
        }
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    #[test]
    fn submenu_hint_follows_child_count() {
        let mut state = NodeState::new(NodeId::ROOT);
        assert!(!state.props.contains(keys::CHILDREN_DISPLAY));

        state.set_children(vec![NodeId(2)]);
        assert_eq!(state.props.text(keys::CHILDREN_DISPLAY, ""), "submenu");

        state.set_children(Vec::new());
        assert_eq!(state.props.text(keys::CHILDREN_DISPLAY, ""), "");
    }

    #[test]
    fn apply_props_reports_only_real_changes() {
        let mut state = NodeState::new(NodeId::ROOT);
        let dirty = state.apply_props([props::label("Edit"), props::enabled(true)]);
        assert_eq!(dirty, vec!["label".to_owned(), "enabled".to_owned()]);

        // same label again, only enabled flips
        let dirty = state.apply_props([props::label("Edit"), props::enabled(false)]);
        assert_eq!(dirty, vec!["enabled".to_owned()]);
    }

    #[test]
    fn apply_props_deduplicates_keys() {
        let mut state = NodeState::new(NodeId::ROOT);
        let dirty = state.apply_props([props::label("a"), props::label("b")]);
        assert_eq!(dirty, vec!["label".to_owned()]);
        assert_eq!(state.props.text(keys::LABEL, ""), "b");
    }
}
