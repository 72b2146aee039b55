//! Change accumulation for a single selection operation.
//!
//! Every public mutation opens an [`Operation`] and records each range it
//! selects or deselects as it goes. Items are resolved at record time, while
//! the indices still point at them. When the operation completes, the
//! records are flattened into one [`SelectionChangedEvent`] that carries only
//! the net change.

use std::collections::BTreeMap;

use canopy_core::logging::targets;

use super::event::SelectionChangedEvent;
use crate::model::{IndexPath, IndexRange};

/// A recorded range of siblings under one parent.
struct Record<T> {
    parent: IndexPath,
    range: IndexRange,
    items: Vec<Option<T>>,
}

impl<T> Record<T> {
    fn new(parent: &IndexPath, range: IndexRange, resolve: impl Fn(usize) -> Option<T>) -> Self {
        Self {
            parent: parent.clone(),
            range,
            items: range.iter().map(resolve).collect(),
        }
    }
}

/// Accumulates the selection changes of one operation.
pub(crate) struct Operation<T> {
    selected: Vec<Record<T>>,
    deselected: Vec<Record<T>>,
}

impl<T> Operation<T> {
    pub(crate) fn new() -> Self {
        Self {
            selected: Vec::new(),
            deselected: Vec::new(),
        }
    }

    /// Records that the children of `parent` in `range` became selected.
    pub(crate) fn selected(
        &mut self,
        parent: &IndexPath,
        range: IndexRange,
        resolve: impl Fn(usize) -> Option<T>,
    ) {
        self.selected.push(Record::new(parent, range, resolve));
    }

    /// Records that the children of `parent` in `range` became deselected.
    pub(crate) fn deselected(
        &mut self,
        parent: &IndexPath,
        range: IndexRange,
        resolve: impl Fn(usize) -> Option<T>,
    ) {
        self.deselected.push(Record::new(parent, range, resolve));
    }

    /// Flattens the records into the net change.
    ///
    /// A path recorded on both sides was deselected and selected again (or
    /// the reverse) within the operation, so its state did not change and it
    /// is dropped from both lists.
    pub(crate) fn into_event(self) -> SelectionChangedEvent<T> {
        let mut selected = flatten(self.selected);
        let mut deselected = flatten(self.deselected);

        selected.retain(|path, _| deselected.remove(path).is_none());

        let (deselected_indexes, deselected_items) = deselected.into_iter().unzip();
        let (selected_indexes, selected_items) = selected.into_iter().unzip();
        SelectionChangedEvent {
            deselected_indexes,
            deselected_items,
            selected_indexes,
            selected_items,
        }
    }
}

fn flatten<T>(records: Vec<Record<T>>) -> BTreeMap<IndexPath, T> {
    let mut paths = BTreeMap::new();
    for record in records {
        for (index, item) in record.range.iter().zip(record.items) {
            let path = record.parent.child(index);
            match item {
                Some(item) => {
                    paths.insert(path, item);
                }
                None => {
                    tracing::warn!(target: targets::SELECTION, %path, "selection change refers to an unresolvable item");
                }
            }
        }
    }
    paths
}
