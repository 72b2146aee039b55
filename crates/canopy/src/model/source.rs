//! Hierarchical data sources.
//!
//! The selection model never owns the tree it selects from. It walks the data
//! through a [`TreeSource`], which maps an item to the live list of its
//! children. Sources are asked lazily, only for the levels a caller actually
//! touches.

use std::fmt;

use super::items::ItemsView;
use super::path::IndexPath;

/// Provides the children of tree items.
///
/// Implement this trait for a type that knows how to enumerate children, or
/// wrap a closure in [`FnTreeSource`].
///
/// `children` may be called while the selection model holds its internal
/// lock. It must not mutate any list the model is observing.
///
/// # Example
///
/// ```
/// use canopy::model::{ItemsList, ItemsView, TreeSource};
///
/// struct Numbers;
///
/// impl TreeSource<u32> for Numbers {
///     fn children(&self, item: &u32) -> Option<ItemsView<u32>> {
///         (*item < 10).then(|| ItemsList::view(vec![item * 10, item * 10 + 1]))
///     }
/// }
///
/// let children = Numbers.children(&1).unwrap();
/// assert_eq!(children.to_vec(), vec![10, 11]);
/// assert!(Numbers.children(&10).is_none());
/// ```
pub trait TreeSource<T>: Send + Sync {
    /// Returns the live child list of `item`, or `None` for a leaf.
    ///
    /// Calling this twice for the same item should return the same list, so
    /// that changes made through one handle are seen by the model.
    fn children(&self, item: &T) -> Option<ItemsView<T>>;

    /// Walks `path` down from `roots` and returns the child list of the
    /// addressed item. The empty path yields `roots` itself.
    fn items_at(&self, roots: &ItemsView<T>, path: &IndexPath) -> Option<ItemsView<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut items = roots.clone();
        for index in path.iter() {
            let item = items.get(index)?;
            items = self.children(&item)?;
        }
        Some(items)
    }

    /// Resolves the item addressed by `path`.
    fn item_at(&self, roots: &ItemsView<T>, path: &IndexPath) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let parent = path.parent()?;
        let index = path.leaf()?;
        self.items_at(roots, &parent)?.get(index)
    }
}

/// A [`TreeSource`] backed by a closure.
///
/// # Example
///
/// ```
/// use canopy::model::{FnTreeSource, ItemsList, TreeSource};
///
/// let source = FnTreeSource::new(|item: &String| {
///     (item.len() < 3).then(|| ItemsList::view(vec![format!("{item}a")]))
/// });
///
/// assert_eq!(source.children(&"x".to_string()).unwrap().to_vec(), vec!["xa"]);
/// ```
pub struct FnTreeSource<F> {
    children: F,
}

impl<F> FnTreeSource<F> {
    pub fn new(children: F) -> Self {
        Self { children }
    }
}

impl<T, F> TreeSource<T> for FnTreeSource<F>
where
    F: Fn(&T) -> Option<ItemsView<T>> + Send + Sync,
{
    fn children(&self, item: &T) -> Option<ItemsView<T>> {
        (self.children)(item)
    }
}

impl<F> fmt::Debug for FnTreeSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTreeSource").finish_non_exhaustive()
    }
}

/// A source in which no item has children.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatSource;

impl<T> TreeSource<T> for FlatSource {
    fn children(&self, _item: &T) -> Option<ItemsView<T>> {
        None
    }
}
