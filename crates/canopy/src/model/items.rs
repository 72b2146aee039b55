//! Observable item lists.
//!
//! An [`ItemsList<T>`] is the live child enumeration of one tree level. It
//! owns its items and announces every structural change through
//! [`ItemsSignals`], which is how the selection model learns that the
//! indices it stores have moved.
//!
//! Signals are emitted after the list's internal lock is released, so a slot
//! may read the list (or mutate it again) from inside the notification.
//!
//! Every change is announced in two phases. Observers inside the crate (the
//! selection nodes bound to this list) hear about it first, then the public
//! `items_*` signals fire. A slot on a public signal therefore always sees
//! selection state that has already followed the change, whenever it was
//! connected.

use std::fmt;
use std::sync::Arc;

use canopy_core::Signal;
use canopy_core::logging::targets;
use parking_lot::RwLock;

/// A shared handle to an [`ItemsList`].
pub type ItemsView<T> = Arc<ItemsList<T>>;

/// A structural change, as delivered to the list's observers.
#[derive(Debug, Clone)]
pub(crate) enum ItemsChange<T> {
    Inserted { index: usize, count: usize },
    Removed { index: usize, items: Vec<T> },
    Reset { previous: Vec<T> },
}

/// Change notifications for an [`ItemsList`].
pub struct ItemsSignals<T> {
    /// First phase of every change, before any public signal.
    pub(crate) observers: Signal<ItemsChange<T>>,

    /// Emitted after items were inserted.
    /// Args: (first index, last index), inclusive
    pub items_inserted: Signal<(usize, usize)>,

    /// Emitted after items were removed.
    /// Args: (first index, the removed items in order)
    pub items_removed: Signal<(usize, Vec<T>)>,

    /// Emitted after the whole contents were replaced.
    /// Args: the previous contents
    pub items_reset: Signal<Vec<T>>,
}

impl<T: 'static> ItemsSignals<T> {
    fn new() -> Self {
        Self {
            observers: Signal::new(),
            items_inserted: Signal::new(),
            items_removed: Signal::new(),
            items_reset: Signal::new(),
        }
    }

    /// Number of selection nodes currently observing the list.
    pub fn observer_count(&self) -> usize {
        self.observers.connection_count()
    }

    /// Disconnects every slot from the public signals. Observing selection
    /// models stay attached.
    pub fn disconnect_all(&self) {
        self.items_inserted.disconnect_all();
        self.items_removed.disconnect_all();
        self.items_reset.disconnect_all();
    }
}

/// An ordered, observable list of items.
///
/// # Example
///
/// ```
/// use canopy::model::ItemsList;
///
/// let list = ItemsList::new(vec!["a", "b"]);
/// list.signals().items_inserted.connect(|&(first, last)| {
///     println!("inserted {first}..={last}");
/// });
///
/// list.push("c");
/// assert_eq!(list.len(), 3);
/// assert_eq!(list.get(2), Some("c"));
/// ```
pub struct ItemsList<T> {
    items: RwLock<Vec<T>>,
    signals: ItemsSignals<T>,
}

impl<T> ItemsList<T> {
    /// The list's change notifications.
    pub fn signals(&self) -> &ItemsSignals<T> {
        &self.signals
    }
}

impl<T: Clone + Send + Sync + 'static> ItemsList<T> {
    /// Creates a list holding `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            signals: ItemsSignals::new(),
        }
    }

    /// Creates an empty list.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Creates a shared view over `items`.
    pub fn view(items: Vec<T>) -> ItemsView<T> {
        Arc::new(Self::new(items))
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns a clone of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// Access the items through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        f(&self.items.read())
    }

    /// Returns a copy of the current contents.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.items.write();
            items.push(item);
            items.len() - 1
        };
        self.emit_inserted(index, index);
    }

    /// Inserts an item at `index`, clamped to the list length.
    pub fn insert(&self, index: usize, item: T) {
        self.insert_many(index, vec![item]);
    }

    /// Inserts several items starting at `index`, clamped to the list length.
    pub fn insert_many(&self, index: usize, new_items: Vec<T>) {
        if new_items.is_empty() {
            return;
        }
        let count = new_items.len();
        let index = {
            let mut items = self.items.write();
            let index = index.min(items.len());
            items.splice(index..index, new_items);
            index
        };
        self.emit_inserted(index, index + count - 1);
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&self, index: usize) -> Option<T> {
        self.remove_range(index, 1).into_iter().next()
    }

    /// Removes up to `count` items starting at `index`, returning them.
    pub fn remove_range(&self, index: usize, count: usize) -> Vec<T> {
        let removed: Vec<T> = {
            let mut items = self.items.write();
            if index >= items.len() {
                return Vec::new();
            }
            let end = index.saturating_add(count).min(items.len());
            items.drain(index..end).collect()
        };
        if !removed.is_empty() {
            tracing::debug!(target: targets::ITEMS, index, count = removed.len(), "items removed");
            self.signals.observers.emit(ItemsChange::Removed {
                index,
                items: removed.clone(),
            });
            self.signals.items_removed.emit((index, removed.clone()));
        }
        removed
    }

    /// Replaces the item at `index`, returning the previous item.
    ///
    /// Observers see a removal followed by an insertion.
    pub fn replace(&self, index: usize, item: T) -> Option<T> {
        let previous = self.remove(index)?;
        self.insert(index, item);
        Some(previous)
    }

    /// Removes every item.
    pub fn clear(&self) {
        self.set_items(Vec::new());
    }

    /// Replaces the whole contents.
    pub fn set_items(&self, new_items: Vec<T>) {
        let previous = std::mem::replace(&mut *self.items.write(), new_items);
        tracing::debug!(target: targets::ITEMS, previous = previous.len(), "items reset");
        self.signals.observers.emit(ItemsChange::Reset {
            previous: previous.clone(),
        });
        self.signals.items_reset.emit(previous);
    }

    fn emit_inserted(&self, first: usize, last: usize) {
        tracing::debug!(target: targets::ITEMS, first, last, "items inserted");
        self.signals.observers.emit(ItemsChange::Inserted {
            index: first,
            count: last - first + 1,
        });
        self.signals.items_inserted.emit((first, last));
    }
}

impl<T: fmt::Debug> fmt::Debug for ItemsList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemsList")
            .field("items", &*self.items.read())
            .finish()
    }
}
