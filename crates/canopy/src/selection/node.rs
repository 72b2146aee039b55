//! The realized selection tree.
//!
//! A [`SelectionTree`] mirrors the data tree sparsely. Each
//! [`SelectionNode`] stands for one data item and stores which of that
//! item's children are selected as an [`IndexRanges`] set. Child nodes are
//! only realized where a selection has to be recorded further down; an empty
//! child slot means nothing below that child is selected.
//!
//! Nodes live in a [`SlotMap`] arena and refer to their children by
//! [`NodeId`]. A node bound to an items list observes it (ahead of the
//! list's public signals) and forwards each change, tagged with its id, to
//! the injected [`ChangeHandler`]. Removing a node from the arena drops its
//! subscriptions, so a stale notification can never reach a released node.

use std::sync::Arc;

use canopy_core::ConnectionId;
use canopy_core::logging::targets;
use slotmap::{SlotMap, new_key_type};

use super::operation::Operation;
use crate::error::{Result, SelectionError};
use crate::model::{
    IndexPath, IndexPathRange, IndexRanges, ItemsChange, ItemsList, ItemsView, TreeSource,
};

new_key_type! {
    /// Identifies a node in a [`SelectionTree`] arena.
    pub(crate) struct NodeId;
}

/// Receives structural changes from the items lists of realized nodes.
pub(crate) type ChangeHandler<T> = Arc<dyn Fn(NodeId, ItemsChange<T>) + Send + Sync>;

/// Selection state for the children of one data item.
pub(crate) struct SelectionNode<T: 'static> {
    path: IndexPath,
    items: Option<ItemsView<T>>,
    ranges: IndexRanges,
    children: Vec<Option<NodeId>>,
    subscription: Option<ConnectionId>,
}

impl<T: 'static> SelectionNode<T> {
    pub(crate) fn path(&self) -> &IndexPath {
        &self.path
    }

    pub(crate) fn ranges(&self) -> &IndexRanges {
        &self.ranges
    }

    pub(crate) fn items(&self) -> Option<&ItemsView<T>> {
        self.items.as_ref()
    }

    /// Number of child slots, realized or not.
    pub(crate) fn slot_count(&self) -> usize {
        self.children.len()
    }

    /// Realized children with their indices.
    pub(crate) fn children(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| child.map(|child| (index, child)))
    }

    fn unsubscribe(&self) {
        if let (Some(items), Some(subscription)) = (&self.items, self.subscription) {
            items.signals().observers.disconnect(subscription);
        }
    }
}

impl<T: Clone + Send + Sync + 'static> SelectionNode<T> {
    /// Number of children the data currently reports.
    fn count(&self) -> usize {
        self.items.as_ref().map_or(0, |items| items.len())
    }

    fn item(&self, index: usize) -> Option<T> {
        self.items.as_ref().and_then(|items| items.get(index))
    }
}

/// Arena of selection nodes rooted at the top-level items.
pub(crate) struct SelectionTree<T: 'static> {
    nodes: SlotMap<NodeId, SelectionNode<T>>,
    root: NodeId,
    source: Arc<dyn TreeSource<T>>,
    on_change: ChangeHandler<T>,
}

impl<T: Clone + Send + Sync + 'static> SelectionTree<T> {
    pub(crate) fn new(
        roots: ItemsView<T>,
        source: Arc<dyn TreeSource<T>>,
        on_change: ChangeHandler<T>,
    ) -> Self {
        let mut tree = Self {
            nodes: SlotMap::with_key(),
            root: NodeId::default(),
            source,
            on_change,
        };
        tree.root = tree.create_node(IndexPath::empty(), Some(roots));
        tree
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&SelectionNode<T>> {
        self.nodes.get(id)
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The top-level items list.
    pub(crate) fn roots(&self) -> Option<ItemsView<T>> {
        self.nodes.get(self.root).and_then(|node| node.items.clone())
    }

    /// Drops every realized node and starts over from `roots`.
    ///
    /// Callers deselect first; selection state below the old root is lost.
    pub(crate) fn rebind_root(&mut self, roots: ItemsView<T>) {
        self.remove_subtree(self.root);
        self.root = self.create_node(IndexPath::empty(), Some(roots));
    }

    fn create_node(&mut self, path: IndexPath, items: Option<ItemsView<T>>) -> NodeId {
        let on_change = self.on_change.clone();
        self.nodes.insert_with_key(|id| {
            let subscription = items
                .as_deref()
                .map(|list| subscribe(list, id, &on_change));
            SelectionNode {
                path,
                items,
                ranges: IndexRanges::new(),
                children: Vec::new(),
                subscription,
            }
        })
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        node.unsubscribe();
        for child in node.children.into_iter().flatten() {
            self.remove_subtree(child);
        }
    }

    /// Validates `path` against the data.
    ///
    /// Returns `path` unchanged if every component is within the child count
    /// at its depth, otherwise the empty path. Realized nodes are used where
    /// they exist; below them the data is walked through the source without
    /// realizing anything.
    pub(crate) fn coerce_index(&self, path: &IndexPath) -> IndexPath {
        let Some(leaf_depth) = path.len().checked_sub(1) else {
            return IndexPath::empty();
        };

        let mut current = self.root;
        for (depth, index) in path.iter().enumerate() {
            let Some(node) = self.nodes.get(current) else {
                break;
            };
            if depth == leaf_depth {
                return if index < node.count() {
                    path.clone()
                } else {
                    IndexPath::empty()
                };
            }
            match node.children.get(index).copied().flatten() {
                Some(child) => current = child,
                None => return self.coerce_transient(node.items.clone(), path, depth),
            }
        }
        IndexPath::empty()
    }

    fn coerce_transient(
        &self,
        mut items: Option<ItemsView<T>>,
        path: &IndexPath,
        from_depth: usize,
    ) -> IndexPath {
        for (depth, index) in path.iter().enumerate().skip(from_depth) {
            let Some(list) = items else {
                return IndexPath::empty();
            };
            if depth + 1 == path.len() {
                return if index < list.len() {
                    path.clone()
                } else {
                    IndexPath::empty()
                };
            }
            let Some(item) = list.get(index) else {
                return IndexPath::empty();
            };
            items = self.source.children(&item);
        }
        IndexPath::empty()
    }

    /// Walks from the root to the node for `path`.
    ///
    /// With `realize`, missing nodes along the way are created. Returns
    /// `None` if the walk leaves the data or, without `realize`, reaches an
    /// empty slot.
    pub(crate) fn try_get_node(&mut self, path: &IndexPath, realize: bool) -> Result<Option<NodeId>> {
        let mut current = self.root;
        for index in path.iter() {
            match self.get_child(current, index, realize)? {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Read-only variant of [`try_get_node`](Self::try_get_node).
    pub(crate) fn find_node(&self, path: &IndexPath) -> Option<NodeId> {
        let mut current = self.root;
        for index in path.iter() {
            current = self.nodes.get(current)?.children.get(index).copied().flatten()?;
        }
        Some(current)
    }

    /// Returns the child of `id` at `index`, creating it if `realize` is set.
    ///
    /// Realizing sizes the slot array to the items count (or just past
    /// `index` for a node without items). A slot array longer than the items
    /// list means an earlier change was missed and is reported as
    /// [`SelectionError::ChildrenOutOfSync`].
    pub(crate) fn get_child(
        &mut self,
        id: NodeId,
        index: usize,
        realize: bool,
    ) -> Result<Option<NodeId>> {
        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(None);
        };
        if !realize {
            return Ok(node.children.get(index).copied().flatten());
        }

        let slots = match &node.items {
            Some(items) => {
                let count = items.len();
                if node.children.len() > count {
                    tracing::error!(
                        target: targets::SELECTION,
                        path = %node.path,
                        children = node.children.len(),
                        items = count,
                        "selection node out of sync with its items"
                    );
                    return Err(SelectionError::ChildrenOutOfSync {
                        path: node.path.clone(),
                        children: node.children.len(),
                        items: count,
                    });
                }
                if index >= count {
                    return Ok(None);
                }
                count
            }
            None => node.children.len().max(index + 1),
        };
        node.children.resize(slots, None);
        if let Some(existing) = node.children.get(index).copied().flatten() {
            return Ok(Some(existing));
        }

        let path = node.path.child(index);
        let child_items = node
            .items
            .as_ref()
            .and_then(|items| items.get(index))
            .and_then(|item| self.source.children(&item));

        tracing::trace!(target: targets::SELECTION, %path, bound = child_items.is_some(), "realizing selection node");
        let child = self.create_node(path, child_items);
        if let Some(slot) = self
            .nodes
            .get_mut(id)
            .and_then(|node| node.children.get_mut(index))
        {
            *slot = Some(child);
        }
        Ok(Some(child))
    }

    /// Selects the children of `id` that fall inside `range`.
    ///
    /// Only this node's own level is affected.
    pub(crate) fn select(&mut self, id: NodeId, range: &IndexPathRange, op: &mut Operation<T>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let Some(span) = range.intersect(&node.path, node.count()) else {
            return;
        };

        let added = node.ranges.add(span);
        let node = &*node;
        for piece in added {
            op.selected(&node.path, piece, |i| node.item(i));
        }
    }

    /// Realizes the parent of `path` and selects its leaf.
    pub(crate) fn select_path(&mut self, path: &IndexPath, op: &mut Operation<T>) -> Result<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if let Some(node) = self.try_get_node(&parent, true)? {
            self.select(node, &IndexPathRange::single(path.clone()), op);
        }
        Ok(())
    }

    /// Deselects every selected path inside `range`, at `id` and below.
    pub(crate) fn deselect(&mut self, id: NodeId, range: &IndexPathRange, op: &mut Operation<T>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };

        if let (Some(first), Some(last)) = (node.ranges.first(), node.ranges.last()) {
            let removed = if range.fully_contains(&node.path.child(first), &node.path.child(last)) {
                node.ranges.clear()
            } else {
                range
                    .intersect(&node.path, last.saturating_add(1))
                    .map(|span| node.ranges.remove(span))
                    .unwrap_or_default()
            };
            let node = &*node;
            for piece in removed {
                op.deselected(&node.path, piece, |i| node.item(i));
            }
        }

        let children: Vec<NodeId> = node.children.iter().flatten().copied().collect();
        for child in children {
            self.deselect(child, range, op);
        }
    }

    /// Deselects everything at `id` and below.
    pub(crate) fn deselect_all(&mut self, id: NodeId, op: &mut Operation<T>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };

        let removed = node.ranges.clear();
        let node = &*node;
        for piece in removed {
            op.deselected(&node.path, piece, |i| node.item(i));
        }

        let children: Vec<NodeId> = node.children.iter().flatten().copied().collect();
        for child in children {
            self.deselect_all(child, op);
        }
    }

    /// Releases every realized child of `id`.
    pub(crate) fn prune_children(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        for child in children.into_iter().flatten() {
            self.remove_subtree(child);
        }
    }

    /// Applies a change reported by the items list of `id`.
    ///
    /// Stored indices are shifted to follow the data, selections on removed
    /// items (and anything selected below them) are recorded as deselected,
    /// and realized nodes that moved get their paths rewritten. Returns
    /// `true` if surviving selected paths changed position.
    pub(crate) fn apply_source_change(
        &mut self,
        id: NodeId,
        change: ItemsChange<T>,
        op: &mut Operation<T>,
    ) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            tracing::trace!(target: targets::SELECTION, "change for a released node ignored");
            return false;
        };

        match change {
            ItemsChange::Inserted { index, count } => {
                tracing::debug!(target: targets::SELECTION, path = %node.path, index, count, "shifting for inserted items");
                let mut moved = node.ranges.last().is_some_and(|last| last >= index);
                node.ranges.insert_shift(index, count);
                if index < node.children.len() {
                    node.children
                        .splice(index..index, std::iter::repeat_n(None, count));
                    moved |= self.repath_children(id, index + count);
                }
                moved
            }
            ItemsChange::Removed { index, items } => {
                let count = items.len();
                tracing::debug!(target: targets::SELECTION, path = %node.path, index, count, "shifting for removed items");

                let removed = node.ranges.remove_shift(index, count);
                let mut moved = node.ranges.last().is_some_and(|last| last >= index);
                for piece in removed {
                    op.deselected(&node.path, piece, |i| {
                        i.checked_sub(index).and_then(|offset| items.get(offset).cloned())
                    });
                }

                let dropped: Vec<NodeId> = if index < node.children.len() {
                    let end = index.saturating_add(count).min(node.children.len());
                    node.children.drain(index..end).flatten().collect()
                } else {
                    Vec::new()
                };
                for child in dropped {
                    self.deselect_all(child, op);
                    self.remove_subtree(child);
                }
                moved |= self.repath_children(id, index);
                moved
            }
            ItemsChange::Reset { previous } => {
                tracing::debug!(target: targets::SELECTION, path = %node.path, previous = previous.len(), "invalidating after reset");

                let removed = node.ranges.clear();
                for piece in removed {
                    op.deselected(&node.path, piece, |i| previous.get(i).cloned());
                }

                let dropped = std::mem::take(&mut node.children);
                for child in dropped.into_iter().flatten() {
                    self.deselect_all(child, op);
                    self.remove_subtree(child);
                }
                false
            }
        }
    }

    /// Rewrites the paths of the realized children of `id` from slot `from`
    /// on. Returns `true` if any of them carries a selection.
    fn repath_children(&mut self, id: NodeId, from: usize) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let moved: Vec<(IndexPath, NodeId)> = node
            .children()
            .filter(|(index, _)| *index >= from)
            .map(|(index, child)| (node.path.child(index), child))
            .collect();

        let mut selected = false;
        for (path, child) in moved {
            selected |= self.repath(child, path);
        }
        selected
    }

    fn repath(&mut self, id: NodeId, path: IndexPath) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let selected = !node.ranges.is_empty();
        if node.path == path {
            return false;
        }
        node.path = path;
        self.repath_children(id, 0) | selected
    }

    pub(crate) fn is_selected(&self, path: &IndexPath) -> bool {
        let (Some(parent), Some(leaf)) = (path.parent(), path.leaf()) else {
            return false;
        };
        self.find_node(&parent)
            .and_then(|id| self.nodes.get(id))
            .is_some_and(|node| node.ranges.contains(leaf))
    }

    /// The smallest selected path and its item.
    pub(crate) fn first_selected(&self) -> Option<(IndexPath, Option<T>)> {
        self.nodes
            .values()
            .filter_map(|node| node.ranges.first().map(|index| (node.path.child(index), node, index)))
            .min_by(|a, b| a.0.cmp(&b.0))
            .map(|(path, node, index)| (path, node.item(index)))
    }

    /// The smallest selected path.
    pub(crate) fn first_selected_path(&self) -> Option<IndexPath> {
        self.nodes
            .values()
            .filter_map(|node| node.ranges.first().map(|index| node.path.child(index)))
            .min()
    }

    /// Every selected path with its item, in ascending path order.
    pub(crate) fn selected(&self) -> Vec<(IndexPath, Option<T>)> {
        let mut selected: Vec<(IndexPath, Option<T>)> = self
            .nodes
            .values()
            .flat_map(|node| {
                node.ranges
                    .indexes()
                    .map(move |index| (node.path.child(index), node.item(index)))
            })
            .collect();
        selected.sort_by(|a, b| a.0.cmp(&b.0));
        selected
    }

    pub(crate) fn selected_count(&self) -> usize {
        self.nodes.values().map(|node| node.ranges.count()).sum()
    }
}

impl<T: 'static> Drop for SelectionTree<T> {
    fn drop(&mut self) {
        for node in self.nodes.values() {
            node.unsubscribe();
        }
    }
}

fn subscribe<T: Clone + Send + Sync + 'static>(
    list: &ItemsList<T>,
    id: NodeId,
    on_change: &ChangeHandler<T>,
) -> ConnectionId {
    let handler = on_change.clone();
    list.signals()
        .observers
        .connect(move |change| handler(id, change.clone()))
}
