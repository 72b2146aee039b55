//! Notification payloads emitted by the selection model.

use std::fmt;

use crate::model::IndexPath;

/// The net change produced by one selection operation.
///
/// `selected_indexes` and `selected_items` are parallel, as are the
/// deselected pair. Paths are in ascending order. A path never appears on
/// both sides, and deselected paths refer to positions before the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChangedEvent<T> {
    pub deselected_indexes: Vec<IndexPath>,
    pub deselected_items: Vec<T>,
    pub selected_indexes: Vec<IndexPath>,
    pub selected_items: Vec<T>,
}

impl<T> SelectionChangedEvent<T> {
    /// Returns `true` if nothing was selected or deselected.
    pub fn is_empty(&self) -> bool {
        self.deselected_indexes.is_empty() && self.selected_indexes.is_empty()
    }
}

impl<T> Default for SelectionChangedEvent<T> {
    fn default() -> Self {
        Self {
            deselected_indexes: Vec::new(),
            deselected_items: Vec::new(),
            selected_indexes: Vec::new(),
            selected_items: Vec::new(),
        }
    }
}

/// Identifies an observable property of the selection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionProperty {
    SelectedIndex,
    SelectedItem,
    SelectedIndexes,
    SelectedItems,
    AnchorIndex,
    SingleSelect,
}

impl SelectionProperty {
    /// The property's name as exposed to bindings.
    pub fn name(self) -> &'static str {
        match self {
            Self::SelectedIndex => "SelectedIndex",
            Self::SelectedItem => "SelectedItem",
            Self::SelectedIndexes => "SelectedIndexes",
            Self::SelectedItems => "SelectedItems",
            Self::AnchorIndex => "AnchorIndex",
            Self::SingleSelect => "SingleSelect",
        }
    }
}

impl fmt::Display for SelectionProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
