//! The hierarchical selection model.
//!
//! [`TreeSelectionModel`] tracks which items of a lazily loaded tree are
//! selected, addressing them by [`IndexPath`]. It follows the data: when an
//! observed items list changes, stored paths are shifted, and selections on
//! removed items are reported as deselected.
//!
//! # Notifications
//!
//! Every mutating call emits at most one [`SelectionChangedEvent`] holding
//! the net change, followed by one [`SelectionProperty`] notification per
//! derived property whose value changed, in this order: `SelectedIndex`,
//! `SelectedItem`, `SelectedIndexes`, `SelectedItems`, `AnchorIndex`,
//! `SingleSelect`. Notifications are emitted after the model's internal lock
//! is released, so slots may call back into the model. A structural change
//! of the data is handled the same way, as its own operation.
//!
//! # Example
//!
//! ```
//! use canopy::model::{FlatSource, IndexPath, ItemsList};
//! use canopy::selection::{TreeSelectionConfig, TreeSelectionModel};
//!
//! let roots = ItemsList::view(vec!["a", "b", "c"]);
//! let model = TreeSelectionModel::with_config(roots, FlatSource, TreeSelectionConfig::multiple());
//!
//! model.selection_changed().connect(|event| {
//!     println!("selected {:?}", event.selected_indexes);
//! });
//!
//! model.select(&IndexPath::from([2])).unwrap();
//! model.select(&IndexPath::from([0])).unwrap();
//! assert_eq!(model.selected_items(), vec!["a", "c"]);
//! assert_eq!(model.selected_index(), IndexPath::from([0]));
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use canopy_core::logging::targets;
use canopy_core::{PerfSpan, Property, Signal, TreeFormatOptions};
use parking_lot::Mutex;

use super::config::TreeSelectionConfig;
use super::debug::SelectionTreeDebug;
use super::event::{SelectionChangedEvent, SelectionProperty};
use super::node::{ChangeHandler, NodeId, SelectionTree};
use super::operation::Operation;
use crate::error::Result;
use crate::model::{IndexPath, IndexPathRange, ItemsChange, ItemsView, TreeSource};

/// Property changes an operation made besides the selection itself.
#[derive(Debug, Clone, Copy, Default)]
struct PropertyChanges {
    anchor_index: bool,
    single_select: bool,
    /// Selected paths moved without being selected or deselected.
    selection_moved: bool,
}

/// How the first selected entry changed during an operation.
#[derive(Debug, Clone, Copy, Default)]
struct FirstSelected {
    index_changed: bool,
    item_changed: bool,
}

impl FirstSelected {
    /// The item changes with the path, and also when the path survives but
    /// the item that held it was deselected (a removal shifted another
    /// selected item into its place).
    fn compare<T>(
        before: Option<IndexPath>,
        after: Option<IndexPath>,
        event: &SelectionChangedEvent<T>,
    ) -> Self {
        let index_changed = before != after;
        let replaced = before
            .as_ref()
            .is_some_and(|path| after.is_some() && event.deselected_indexes.contains(path));
        Self {
            index_changed,
            item_changed: index_changed || replaced,
        }
    }
}

struct Shared<T: 'static> {
    tree: Mutex<SelectionTree<T>>,
    config: TreeSelectionConfig,
    single_select: Property<bool>,
    anchor_index: Property<IndexPath>,
    selection_changed: Signal<SelectionChangedEvent<T>>,
    property_changed: Signal<SelectionProperty>,
}

/// Selection state over a tree of `T` items.
///
/// The model is a cheap handle: clones share the same state. `T` is cloned
/// whenever an item is reported, so it is typically an `Arc` or a small
/// value type.
///
/// The data is observed through [`ItemsList`](crate::model::ItemsList)
/// signals. A [`TreeSource`] passed to the model must not mutate an observed
/// list from inside [`TreeSource::children`].
pub struct TreeSelectionModel<T: 'static> {
    shared: Arc<Shared<T>>,
}

impl<T: 'static> Clone for TreeSelectionModel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> TreeSelectionModel<T> {
    /// Creates a single-select model over `roots`.
    pub fn new<S>(roots: ItemsView<T>, source: S) -> Self
    where
        S: TreeSource<T> + 'static,
    {
        Self::with_config(roots, source, TreeSelectionConfig::default())
    }

    /// Creates a model with explicit options.
    pub fn with_config<S>(roots: ItemsView<T>, source: S, config: TreeSelectionConfig) -> Self
    where
        S: TreeSource<T> + 'static,
    {
        let source: Arc<dyn TreeSource<T>> = Arc::new(source);
        let shared = Arc::new_cyclic(|weak: &Weak<Shared<T>>| {
            let weak = weak.clone();
            let on_change: ChangeHandler<T> = Arc::new(move |node: NodeId, change: ItemsChange<T>| {
                if let Some(shared) = weak.upgrade() {
                    shared.source_changed(node, change);
                }
            });

            Shared {
                tree: Mutex::new(SelectionTree::new(roots, source, on_change)),
                config,
                single_select: Property::new(config.single_select),
                anchor_index: Property::default(),
                selection_changed: Signal::new(),
                property_changed: Signal::new(),
            }
        });
        tracing::debug!(target: targets::SELECTION, single_select = config.single_select, "selection model created");
        Self { shared }
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Emitted once per operation that changed the selection.
    pub fn selection_changed(&self) -> &Signal<SelectionChangedEvent<T>> {
        &self.shared.selection_changed
    }

    /// Emitted for each derived property whose value changed.
    pub fn property_changed(&self) -> &Signal<SelectionProperty> {
        &self.shared.property_changed
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The model's current options.
    pub fn config(&self) -> TreeSelectionConfig {
        self.shared
            .config
            .with_single_select(self.shared.single_select.get())
    }

    /// The top-level items.
    pub fn roots(&self) -> Option<ItemsView<T>> {
        self.shared.tree.lock().roots()
    }

    pub fn single_select(&self) -> bool {
        self.shared.single_select.get()
    }

    /// The path last targeted by a selecting call.
    pub fn anchor_index(&self) -> IndexPath {
        self.shared.anchor_index.get()
    }

    /// The first selected path in tree order, or the empty path.
    pub fn selected_index(&self) -> IndexPath {
        self.shared
            .tree
            .lock()
            .first_selected_path()
            .unwrap_or_default()
    }

    /// The item at [`selected_index`](Self::selected_index).
    pub fn selected_item(&self) -> Option<T> {
        self.shared
            .tree
            .lock()
            .first_selected()
            .and_then(|(_, item)| item)
    }

    /// Every selected path, in ascending order.
    pub fn selected_indexes(&self) -> Vec<IndexPath> {
        self.shared
            .tree
            .lock()
            .selected()
            .into_iter()
            .map(|(path, _)| path)
            .collect()
    }

    /// The items at [`selected_indexes`](Self::selected_indexes).
    pub fn selected_items(&self) -> Vec<T> {
        self.shared
            .tree
            .lock()
            .selected()
            .into_iter()
            .filter_map(|(_, item)| item)
            .collect()
    }

    pub fn is_selected(&self, path: &IndexPath) -> bool {
        self.shared.tree.lock().is_selected(path)
    }

    pub fn selected_count(&self) -> usize {
        self.shared.tree.lock().selected_count()
    }

    pub fn has_selection(&self) -> bool {
        self.selected_count() > 0
    }

    /// Renders the realized selection nodes, for diagnostics.
    pub fn debug_tree(&self) -> String {
        self.debug_tree_with(&TreeFormatOptions::default())
    }

    /// Renders the realized selection nodes with custom options.
    pub fn debug_tree_with(&self, options: &TreeFormatOptions) -> String {
        SelectionTreeDebug::new(options).format(&self.shared.tree.lock())
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Selects the item at `path` and makes it the anchor.
    ///
    /// A path that does not resolve against the data is ignored. In
    /// single-select mode the previous selection is replaced.
    #[tracing::instrument(skip_all, target = "canopy::selection", level = "debug", fields(path = %path))]
    pub fn select(&self, path: &IndexPath) -> Result<()> {
        self.shared.update(|shared, tree, op| {
            let path = tree.coerce_index(path);
            if path.is_empty() {
                tracing::debug!(target: targets::SELECTION, "ignoring unresolvable path");
                return Ok(PropertyChanges::default());
            }
            shared.select_in(tree, op, path)
        })
    }

    /// Deselects the item at `path`. The anchor is left alone.
    pub fn deselect(&self, path: &IndexPath) {
        self.deselect_range(path, path);
    }

    /// Selects the siblings from `begin` to `end`, inclusive.
    ///
    /// Both paths must share a parent; the span is clamped to the children
    /// that exist. In single-select mode only `end` is selected. The anchor
    /// is not changed.
    #[tracing::instrument(skip_all, target = "canopy::selection", level = "debug", fields(begin = %begin, end = %end))]
    pub fn select_range(&self, begin: &IndexPath, end: &IndexPath) -> Result<()> {
        self.shared.update(|shared, tree, op| {
            let parent = match (begin.parent(), end.parent()) {
                (Some(a), Some(b)) if a == b => a,
                _ => {
                    tracing::debug!(target: targets::SELECTION, "range bounds are not siblings");
                    return Ok(PropertyChanges::default());
                }
            };

            if shared.single_select.get() {
                let path = tree.coerce_index(end);
                if path.is_empty() {
                    return Ok(PropertyChanges::default());
                }
                return shared.select_in(tree, op, path);
            }

            if !parent.is_empty() && tree.coerce_index(&parent).is_empty() {
                return Ok(PropertyChanges::default());
            }
            if let Some(node) = tree.try_get_node(&parent, true)? {
                let range = IndexPathRange::new(begin.clone(), end.clone());
                tree.select(node, &range, op);
            }
            Ok(PropertyChanges::default())
        })
    }

    /// Deselects every selected path from `begin` to `end` in tree order,
    /// including descendants of items in between.
    #[tracing::instrument(skip_all, target = "canopy::selection", level = "debug", fields(begin = %begin, end = %end))]
    pub fn deselect_range(&self, begin: &IndexPath, end: &IndexPath) {
        let range = IndexPathRange::new(begin.clone(), end.clone());
        self.shared.update_infallible(|_, tree, op| {
            let root = tree.root();
            tree.deselect(root, &range, op);
            PropertyChanges::default()
        });
    }

    /// Replaces the selection with `path`, or clears it if `path` is empty
    /// or does not resolve. The anchor moves only to a resolvable path.
    #[tracing::instrument(skip_all, target = "canopy::selection", level = "debug", fields(path = %path))]
    pub fn set_selected_index(&self, path: &IndexPath) -> Result<()> {
        self.shared.update(|shared, tree, op| {
            let path = tree.coerce_index(path);
            let root = tree.root();
            tree.deselect_all(root, op);
            if path.is_empty() {
                return Ok(PropertyChanges::default());
            }
            tree.select_path(&path, op)?;
            Ok(PropertyChanges {
                anchor_index: shared.anchor_index.set(path),
                ..Default::default()
            })
        })
    }

    /// Deselects everything.
    #[tracing::instrument(skip_all, target = "canopy::selection", level = "debug")]
    pub fn clear(&self) {
        self.shared.update_infallible(|shared, tree, op| {
            let root = tree.root();
            tree.deselect_all(root, op);
            if shared.config.prune_on_clear {
                tree.prune_children(root);
            }
            PropertyChanges::default()
        });
    }

    /// Switches between single and multiple selection.
    ///
    /// Entering single-select mode keeps only the anchor if it is selected,
    /// otherwise the first selected path.
    #[tracing::instrument(skip_all, target = "canopy::selection", level = "debug", fields(single_select = single_select))]
    pub fn set_single_select(&self, single_select: bool) -> Result<()> {
        self.shared.update(|shared, tree, op| {
            let changed = shared.single_select.set(single_select);
            if changed && single_select {
                let anchor = shared.anchor_index.get();
                let keep = if tree.is_selected(&anchor) {
                    Some(anchor)
                } else {
                    tree.first_selected_path()
                };
                let root = tree.root();
                tree.deselect_all(root, op);
                if let Some(keep) = keep {
                    tree.select_path(&keep, op)?;
                }
            }
            Ok(PropertyChanges {
                single_select: changed,
                ..Default::default()
            })
        })
    }

    /// Sets the anchor without touching the selection.
    pub fn set_anchor_index(&self, path: IndexPath) {
        self.shared.update_infallible(|shared, _, _| PropertyChanges {
            anchor_index: shared.anchor_index.set(path),
            ..Default::default()
        });
    }

    /// Replaces the top-level items, deselecting everything.
    #[tracing::instrument(skip_all, target = "canopy::selection", level = "debug")]
    pub fn set_roots(&self, roots: ItemsView<T>) {
        self.shared.update_infallible(|_, tree, op| {
            let root = tree.root();
            tree.deselect_all(root, op);
            tree.rebind_root(roots);
            PropertyChanges::default()
        });
    }
}

impl<T: Clone + Send + Sync + 'static> Shared<T> {
    /// Runs one operation under the lock, then publishes its notifications.
    ///
    /// Changes made before an error are still published.
    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&Self, &mut SelectionTree<T>, &mut Operation<T>) -> Result<PropertyChanges>,
    {
        let mut op = Operation::new();
        let (result, before, after) = {
            let mut tree = self.tree.lock();
            let before = tree.first_selected_path();
            let result = apply(self, &mut tree, &mut op);
            (result, before, tree.first_selected_path())
        };

        let changes = match &result {
            Ok(changes) => *changes,
            Err(err) => {
                tracing::error!(target: targets::SELECTION, error = %err, "selection operation failed");
                PropertyChanges::default()
            }
        };
        let event = op.into_event();
        let first = FirstSelected::compare(before, after, &event);
        self.publish(event, changes, first);
        result.map(|_| ())
    }

    fn update_infallible<F>(&self, apply: F)
    where
        F: FnOnce(&Self, &mut SelectionTree<T>, &mut Operation<T>) -> PropertyChanges,
    {
        // Infallible closures cannot produce the error branch.
        let _ = self.update(|shared, tree, op| Ok(apply(shared, tree, op)));
    }

    /// Selects a resolved `path`, replacing the selection in single-select
    /// mode, and anchors it.
    fn select_in(
        &self,
        tree: &mut SelectionTree<T>,
        op: &mut Operation<T>,
        path: IndexPath,
    ) -> Result<PropertyChanges> {
        if self.single_select.get() {
            let root = tree.root();
            tree.deselect_all(root, op);
        }
        tree.select_path(&path, op)?;
        Ok(PropertyChanges {
            anchor_index: self.anchor_index.set(path),
            ..Default::default()
        })
    }

    fn source_changed(&self, node: NodeId, change: ItemsChange<T>) {
        let _span = PerfSpan::new("selection.source_changed");
        self.update_infallible(|_, tree, op| PropertyChanges {
            selection_moved: tree.apply_source_change(node, change, op),
            ..Default::default()
        });
    }

    fn publish(&self, event: SelectionChangedEvent<T>, changes: PropertyChanges, first: FirstSelected) {
        let selection_changed = !event.is_empty();
        if selection_changed {
            tracing::debug!(
                target: targets::SELECTION,
                selected = event.selected_indexes.len(),
                deselected = event.deselected_indexes.len(),
                "selection changed"
            );
            self.selection_changed.emit(event);
        }

        let notify = |property: SelectionProperty| {
            tracing::trace!(target: targets::SELECTION, property = property.name(), "property changed");
            self.property_changed.emit(property);
        };
        if first.index_changed {
            notify(SelectionProperty::SelectedIndex);
        }
        if first.item_changed {
            notify(SelectionProperty::SelectedItem);
        }
        if selection_changed || changes.selection_moved {
            notify(SelectionProperty::SelectedIndexes);
        }
        if selection_changed {
            notify(SelectionProperty::SelectedItems);
        }
        if changes.anchor_index {
            notify(SelectionProperty::AnchorIndex);
        }
        if changes.single_select {
            notify(SelectionProperty::SingleSelect);
        }
    }
}

impl<T: Clone + Send + Sync + 'static> fmt::Debug for TreeSelectionModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.shared.tree.lock();
        f.debug_struct("TreeSelectionModel")
            .field("single_select", &self.shared.single_select.get())
            .field("anchor_index", &self.shared.anchor_index.get())
            .field("selected_count", &tree.selected_count())
            .field("realized_nodes", &tree.node_count())
            .finish()
    }
}
