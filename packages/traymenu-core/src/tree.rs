use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::{Error, Result};
use crate::event::{Event, EventGroupReport, EventHandler};
use crate::ids::{NodeId, Revision};
use crate::layout::{Layout, NodeProps};
use crate::node::{MenuNode, NodeState};
use crate::notify::{ChangeNotifier, PropertyUpdate};
use crate::props::{keys, PropValue, PropertyBag, PropertyFilter};

/// Mutable menu hierarchy shared between the embedding application and the
/// desktop-shell transport.
///
/// Any thread may mutate or query the tree concurrently. The tree-wide lock
/// guards the node map, identity allocation, revision counter, and root
/// child order; each node's own lock guards that node's property bag and
/// child order. Node locks are only ever taken with the tree lock held, and
/// an operation touching two nodes' orders applies them in ascending
/// identity order. Layout queries hold the tree read lock for the whole
/// walk, so a snapshot never observes a partially-applied mutation.
pub struct MenuTree<N: ChangeNotifier> {
    notifier: N,
    tree: RwLock<TreeState>,
}

struct TreeState {
    next_id: i32,
    revision: Revision,
    nodes: HashMap<NodeId, Arc<MenuNode>>,
    children: Vec<NodeId>,
    handler: Option<EventHandler>,
}

/// Collects notification failures for one mutation. The mutation is already
/// committed when these are reported; nothing is rolled back.
#[derive(Default)]
struct DeliveryErrors(Vec<String>);

impl DeliveryErrors {
    fn push(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.0.push(err.to_string());
        }
    }

    fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::Notification(self.0))
        }
    }
}

fn root_properties() -> BTreeMap<String, PropValue> {
    BTreeMap::from([(
        keys::CHILDREN_DISPLAY.to_owned(),
        PropValue::text("submenu"),
    )])
}

impl TreeState {
    fn is_attachable(&self, parent: NodeId) -> bool {
        parent.is_root() || self.nodes.contains_key(&parent)
    }

    fn children_of(&self, parent: NodeId) -> Option<Vec<NodeId>> {
        if parent.is_root() {
            return Some(self.children.clone());
        }
        self.nodes.get(&parent).map(|n| n.read().children.clone())
    }

    fn set_children_of(&mut self, parent: NodeId, children: Vec<NodeId>) {
        if parent.is_root() {
            self.children = children;
        } else if let Some(node) = self.nodes.get(&parent) {
            node.write().set_children(children);
        }
    }

    /// Applies two child orders, taking the node locks in ascending identity
    /// order. The root order needs no node lock and sorts first anyway.
    fn set_children_pair(&mut self, a: NodeId, ac: Vec<NodeId>, b: NodeId, bc: Vec<NodeId>) {
        if a <= b {
            self.set_children_of(a, ac);
            self.set_children_of(b, bc);
        } else {
            self.set_children_of(b, bc);
            self.set_children_of(a, ac);
        }
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).map(|n| n.read().parent)
    }

    /// Whether `candidate` is `id` itself or sits somewhere below it.
    fn is_in_subtree(&self, id: NodeId, candidate: NodeId) -> bool {
        let mut current = candidate;
        loop {
            if current == id {
                return true;
            }
            if current.is_root() {
                return false;
            }
            match self.parent_of(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn build_forest(&self, ids: &[NodeId], depth: i32, filter: &PropertyFilter) -> Vec<Layout> {
        if depth == 0 {
            // -1 means unbounded, so the check is against exactly 0.
            return Vec::new();
        }
        let below = if depth > 0 { depth - 1 } else { depth };
        ids.iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| self.build_node(node, below, filter))
            .collect()
    }

    fn build_node(&self, node: &Arc<MenuNode>, depth: i32, filter: &PropertyFilter) -> Layout {
        let (properties, children) = {
            let state = node.read();
            (state.props.filtered_view(filter), state.children.clone())
        };
        Layout {
            id: node.id,
            properties,
            children: self.build_forest(&children, depth, filter),
        }
    }
}

impl<N: ChangeNotifier> MenuTree<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            tree: RwLock::new(TreeState {
                next_id: 0,
                revision: 0,
                nodes: HashMap::new(),
                children: Vec::new(),
                handler: None,
            }),
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn read(&self) -> RwLockReadGuard<'_, TreeState> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TreeState> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current freshness token. Strictly non-decreasing; every externally
    /// visible change bumps it by at least one.
    pub fn revision(&self) -> Revision {
        self.read().revision
    }

    /// Number of stored nodes, the root pseudo-node excluded.
    pub fn node_count(&self) -> usize {
        self.read().nodes.len()
    }

    pub fn is_known(&self, id: NodeId) -> bool {
        id.is_root() || self.read().nodes.contains_key(&id)
    }

    /// Child order of `parent`, or `None` for an unknown id.
    pub fn children(&self, parent: NodeId) -> Option<Vec<NodeId>> {
        self.read().children_of(parent)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.read().parent_of(id)
    }

    /// Whether `id` currently has children and is advertised as a submenu.
    pub fn is_submenu(&self, id: NodeId) -> bool {
        self.read()
            .nodes
            .get(&id)
            .map(|n| !n.read().children.is_empty())
            .unwrap_or(false)
    }

    /// Creates a new item as the last child of `parent` (the root sentinel
    /// adds at the top level) and applies `props` to it. The parent becomes
    /// a submenu if this is its first child.
    ///
    /// Fails with `InvalidParent` before any state change when `parent` does
    /// not resolve. On a notification error the child nevertheless exists.
    pub fn add_child(
        &self,
        parent: NodeId,
        props: impl IntoIterator<Item = (String, PropValue)>,
    ) -> Result<NodeId> {
        let mut state = self.write();
        if !state.is_attachable(parent) {
            return Err(Error::InvalidParent(parent));
        }

        state.next_id += 1;
        let id = NodeId(state.next_id);
        let mut body = NodeState::new(parent);
        let dirty = body.apply_props(props);
        let initial: Vec<(String, PropValue)> = dirty
            .iter()
            .filter_map(|k| body.props.value(k).map(|v| (k.clone(), v.clone())))
            .collect();
        state.nodes.insert(id, Arc::new(MenuNode::new(id, body)));

        let mut order = state.children_of(parent).unwrap_or_default();
        order.push(id);
        state.set_children_of(parent, order);
        state.revision += 1;
        let revision = state.revision;

        let mut errs = DeliveryErrors::default();
        errs.push(self.notifier.layout_updated(revision, parent));
        if !initial.is_empty() {
            errs.push(
                self.notifier
                    .properties_updated(&[PropertyUpdate { id, props: initial }], &[]),
            );
        }
        errs.finish()?;
        Ok(id)
    }

    /// Removes `id` and its whole subtree atomically, demoting the parent
    /// out of the submenu state if this was its last child. Removing an id
    /// that is already gone is a no-op, not an error.
    pub fn remove(&self, id: NodeId) -> Result<()> {
        let mut state = self.write();
        let Some(node) = state.nodes.get(&id).cloned() else {
            return Ok(());
        };
        let parent = node.read().parent;

        if let Some(mut order) = state.children_of(parent) {
            order.retain(|c| *c != id);
            state.set_children_of(parent, order);
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(gone) = state.nodes.remove(&next) {
                stack.extend(gone.read().children.iter().copied());
            }
        }
        state.revision += 1;
        let revision = state.revision;

        let mut errs = DeliveryErrors::default();
        errs.push(self.notifier.layout_updated(revision, parent));
        errs.finish()
    }

    /// Makes `id` the immediate predecessor of `sibling` in `sibling`'s
    /// parent's order, transferring it between parents when they differ. If
    /// `sibling` is missing from that order, `id` is appended at the end
    /// instead. Either id being gone, or a destination inside `id`'s own
    /// subtree, is a tolerant no-op.
    pub fn move_before(&self, id: NodeId, sibling: NodeId) -> Result<()> {
        if id == sibling {
            return Ok(());
        }
        let mut state = self.write();
        let Some(node) = state.nodes.get(&id).cloned() else {
            return Ok(());
        };
        if !state.nodes.contains_key(&sibling) {
            return Ok(());
        }
        let src = node.read().parent;
        let Some(dst) = state.parent_of(sibling) else {
            return Ok(());
        };
        if !src.is_root() && !state.nodes.contains_key(&src) {
            return Ok(());
        }
        if !dst.is_root() && state.is_in_subtree(id, dst) {
            return Ok(());
        }

        if src == dst {
            let mut order = state.children_of(dst).unwrap_or_default();
            order.retain(|c| *c != id);
            let at = order
                .iter()
                .position(|c| *c == sibling)
                .unwrap_or(order.len());
            order.insert(at, id);
            state.set_children_of(dst, order);
        } else {
            let mut from = state.children_of(src).unwrap_or_default();
            from.retain(|c| *c != id);
            let mut to = state.children_of(dst).unwrap_or_default();
            let at = to.iter().position(|c| *c == sibling).unwrap_or(to.len());
            to.insert(at, id);
            state.set_children_pair(src, from, dst, to);
            node.write().parent = dst;
        }
        state.revision += 1;
        let revision = state.revision;

        let mut errs = DeliveryErrors::default();
        errs.push(self.notifier.layout_updated(revision, src));
        if dst != src {
            errs.push(self.notifier.layout_updated(revision, dst));
        }
        errs.finish()
    }

    /// Applies `props` to `id` and announces the subset of keys whose value
    /// actually changed. Writing only already-current values emits nothing
    /// and leaves the revision untouched.
    pub fn set_properties(
        &self,
        id: NodeId,
        props: impl IntoIterator<Item = (String, PropValue)>,
    ) -> Result<()> {
        let mut state = self.write();
        let node = state
            .nodes
            .get(&id)
            .cloned()
            .ok_or(Error::NodeNotFound(id))?;
        let (dirty, updated) = {
            let mut body = node.write();
            let dirty = body.apply_props(props);
            let updated: Vec<(String, PropValue)> = dirty
                .iter()
                .filter_map(|k| body.props.value(k).map(|v| (k.clone(), v.clone())))
                .collect();
            (dirty, updated)
        };
        if dirty.is_empty() {
            return Ok(());
        }
        state.revision += 1;
        let revision = state.revision;

        let mut errs = DeliveryErrors::default();
        errs.push(
            self.notifier
                .properties_updated(&[PropertyUpdate { id, props: updated }], &[]),
        );
        // an explicit write to the submenu hint changes the displayed shape
        if dirty.iter().any(|k| k == keys::CHILDREN_DISPLAY) {
            errs.push(self.notifier.layout_updated(revision, id));
        }
        errs.finish()
    }

    /// Builds a point-in-time snapshot of the subtree rooted at `root`.
    /// Depth 0 returns the node itself with no children;
    /// [`DEPTH_UNLIMITED`](crate::ids::DEPTH_UNLIMITED) walks everything.
    /// The whole walk runs under one tree read lock.
    pub fn layout(
        &self,
        root: NodeId,
        depth: i32,
        filter: &PropertyFilter,
    ) -> Result<(Revision, Layout)> {
        debug!(root = root.0, depth, "menu method GetLayout");
        let state = self.read();
        let layout = if root.is_root() {
            Layout {
                id: NodeId::ROOT,
                properties: root_properties(),
                children: state.build_forest(&state.children, depth, filter),
            }
        } else {
            let node = state.nodes.get(&root).ok_or(Error::NodeNotFound(root))?;
            state.build_node(node, depth, filter)
        };
        Ok((state.revision, layout))
    }

    /// Properties for each requested id, in request order; unknown ids are
    /// silently skipped. An empty `ids` list means every known node, in
    /// ascending identity order.
    pub fn group_properties(&self, ids: &[NodeId], filter: &PropertyFilter) -> Vec<NodeProps> {
        debug!(count = ids.len(), "menu method GetGroupProperties");
        let state = self.read();
        let requested: Vec<NodeId> = if ids.is_empty() {
            let mut all: Vec<NodeId> = state.nodes.keys().copied().collect();
            all.sort();
            all
        } else {
            ids.to_vec()
        };
        requested
            .iter()
            .filter_map(|id| {
                state.nodes.get(id).map(|node| NodeProps {
                    id: *id,
                    properties: node.read().props.filtered_view(filter),
                })
            })
            .collect()
    }

    /// Point lookup that distinguishes "no such property" from a default
    /// value: unknown ids and absent keys both fail with a not-found error
    /// instead of defaulting.
    pub fn property(&self, id: NodeId, name: &str) -> Result<PropValue> {
        debug!(id = id.0, name, "menu method GetProperty");
        let state = self.read();
        let node = state.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        let body = node.read();
        body.props
            .value(name)
            .cloned()
            .ok_or_else(|| Error::PropertyNotFound {
                id,
                name: name.to_owned(),
            })
    }

    /// Runs `f` against `id`'s property bag under the point-read locks
    /// (tree read plus node read).
    pub fn with_props<R>(&self, id: NodeId, f: impl FnOnce(&PropertyBag) -> R) -> Result<R> {
        let state = self.read();
        let node = state.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        let body = node.read();
        Ok(f(&body.props))
    }

    /// Sets the handler that receives events addressed to the root sentinel.
    pub fn set_handler(&self, handler: Option<EventHandler>) {
        self.write().handler = handler;
    }

    pub fn set_node_handler(&self, id: NodeId, handler: Option<EventHandler>) -> Result<()> {
        let state = self.read();
        let node = state.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        node.write().handler = handler;
        Ok(())
    }

    fn handler_for(&self, id: NodeId) -> Option<EventHandler> {
        let state = self.read();
        if id.is_root() {
            return state.handler.clone();
        }
        state.nodes.get(&id).and_then(|n| n.read().handler.clone())
    }

    /// Dispatches one input event to the addressed node's handler, or to the
    /// tree default for the root sentinel. Unknown ids are silently ignored:
    /// the shell may race against local removal, and that is not a fault.
    /// The handler runs with no tree locks held.
    pub fn deliver_event(&self, event: &Event) -> Result<()> {
        debug!(
            id = event.id.0,
            kind = event.kind.as_str(),
            timestamp = event.timestamp,
            "menu method Event"
        );
        let Some(handler) = self.handler_for(event.id) else {
            return Ok(());
        };
        handler(&event.kind, event.payload.as_ref(), event.timestamp)
            .map_err(|err| Error::Handler(err.to_string()))
    }

    /// Dispatches a batch of events, reporting failures per id.
    pub fn deliver_event_group(&self, events: &[Event]) -> EventGroupReport {
        debug!(count = events.len(), "menu method EventGroup");
        let mut report = EventGroupReport::default();
        for event in events {
            if let Err(err) = self.deliver_event(event) {
                report.record(event.id, err);
            }
        }
        report
    }

    /// Asks the environment to activate `id`.
    pub fn request_activation(&self, id: NodeId, timestamp: u32) -> Result<()> {
        {
            let state = self.read();
            if !id.is_root() && !state.nodes.contains_key(&id) {
                return Err(Error::NodeNotFound(id));
            }
        }
        let mut errs = DeliveryErrors::default();
        errs.push(self.notifier.activation_requested(id, timestamp));
        errs.finish()
    }

    /// Validates parent/child agreement, unique membership, full node-map
    /// reachability, and the derived submenu hint. Intended for tests and
    /// debugging.
    pub fn validate_invariants(&self) -> Result<()> {
        let state = self.read();
        let mut seen = HashSet::new();
        let mut queue: Vec<(NodeId, Vec<NodeId>)> =
            vec![(NodeId::ROOT, state.children.clone())];
        while let Some((parent, children)) = queue.pop() {
            for child in children {
                let Some(node) = state.nodes.get(&child) else {
                    return Err(Error::InconsistentState(format!(
                        "child {child} of {parent} not in node map"
                    )));
                };
                if !seen.insert(child) {
                    return Err(Error::InconsistentState(format!(
                        "{child} appears in more than one child order"
                    )));
                }
                let body = node.read();
                if body.parent != parent {
                    return Err(Error::InconsistentState(format!(
                        "{child} records parent {} but sits under {parent}",
                        body.parent
                    )));
                }
                let display = body.props.text(keys::CHILDREN_DISPLAY, "");
                if body.children.is_empty() != (display != "submenu") {
                    return Err(Error::InconsistentState(format!(
                        "{child} submenu hint disagrees with its child count"
                    )));
                }
                queue.push((child, body.children.clone()));
            }
        }
        if seen.len() != state.nodes.len() {
            return Err(Error::InconsistentState(
                "node map contains entries unreachable from the root".into(),
            ));
        }
        Ok(())
    }
}
