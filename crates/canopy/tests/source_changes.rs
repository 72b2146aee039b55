//! Selection tracking across structural changes of the data.

mod common;

use std::sync::Arc;

use canopy::prelude::*;
use common::*;

fn children_of(data: &ItemsView<NodeRef>, index: usize) -> ItemsView<NodeRef> {
    data.get(index)
        .and_then(|node| node.children())
        .expect("fixture node has children")
}

// =============================================================================
// Insertion
// =============================================================================

#[test]
fn test_inserting_item_before_selected_item_shifts_selection() {
    init_logging();
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([1])).unwrap();
    let events = record_events(&target);
    let properties = record_properties(&target);

    data.insert(0, Node::new(p([99])));

    assert!(events.lock().is_empty());
    assert_eq!(target.selected_index(), p([2]));
    assert_eq!(target.selected_indexes(), vec![p([2])]);
    assert_eq!(caption(target.selected_item()).as_deref(), Some("Node 1"));
    assert_eq!(
        *properties.lock(),
        vec![
            SelectionProperty::SelectedIndex,
            SelectionProperty::SelectedItem,
            SelectionProperty::SelectedIndexes,
        ]
    );
}

#[test]
fn test_inserting_item_before_selected_parent_shifts_nested_selection() {
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([1, 2])).unwrap();
    let events = record_events(&target);

    data.insert(0, Node::new(p([99])));

    assert!(events.lock().is_empty());
    assert_eq!(target.selected_index(), p([2, 2]));
    assert_eq!(caption(target.selected_item()).as_deref(), Some("Node 1-2"));
    assert!(target.is_selected(&p([2, 2])));
    assert!(!target.is_selected(&p([1, 2])));
}

#[test]
fn test_inserting_item_after_selected_item_changes_nothing() {
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([1])).unwrap();
    let events = record_events(&target);
    let properties = record_properties(&target);

    data.insert(3, Node::new(p([99])));

    assert!(events.lock().is_empty());
    assert!(properties.lock().is_empty());
    assert_eq!(target.selected_index(), p([1]));
}

#[test]
fn test_inserting_into_selected_range_splits_it() {
    let data = create_data();
    let target = create_multi_target(data.clone());
    target.select_range(&p([0]), &p([2])).unwrap();
    let events = record_events(&target);
    let properties = record_properties(&target);

    data.insert(1, Node::new(p([99])));

    assert!(events.lock().is_empty());
    assert_eq!(target.selected_indexes(), vec![p([0]), p([2]), p([3])]);
    assert_eq!(
        captions(&target.selected_items()),
        vec!["Node 0", "Node 1", "Node 2"]
    );
    assert!(!target.is_selected(&p([1])));
    assert_eq!(count(&properties, SelectionProperty::SelectedIndexes), 1);
    assert_eq!(count(&properties, SelectionProperty::SelectedIndex), 0);
}

#[test]
fn test_inserting_into_child_list_shifts_child_selection() {
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([3, 3])).unwrap();

    children_of(&data, 3).insert_many(0, vec![Node::new(p([3, 90])), Node::new(p([3, 91]))]);

    assert_eq!(target.selected_index(), p([3, 5]));
    assert_eq!(caption(target.selected_item()).as_deref(), Some("Node 3-3"));
}

#[test]
fn test_anchor_does_not_follow_insertions() {
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([1])).unwrap();

    data.insert(0, Node::new(p([99])));

    assert_eq!(target.selected_index(), p([2]));
    assert_eq!(target.anchor_index(), p([1]));
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn test_removing_selected_item_deselects_it() {
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([1])).unwrap();
    let events = record_events(&target);
    let properties = record_properties(&target);

    data.remove(1);

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].deselected_indexes, vec![p([1])]);
    assert_eq!(captions(&events[0].deselected_items), vec!["Node 1"]);
    assert!(events[0].selected_indexes.is_empty());
    assert!(target.selected_index().is_empty());
    assert!(target.selected_item().is_none());
    assert_eq!(
        *properties.lock(),
        vec![
            SelectionProperty::SelectedIndex,
            SelectionProperty::SelectedItem,
            SelectionProperty::SelectedIndexes,
            SelectionProperty::SelectedItems,
        ]
    );
}

#[test]
fn test_removing_parent_deselects_selected_descendants() {
    let data = create_data();
    let target = create_multi_target(data.clone());
    target.select(&p([1, 2])).unwrap();
    target.select(&p([1, 3])).unwrap();
    target.select(&p([4])).unwrap();
    let events = record_events(&target);

    data.remove(1);

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].deselected_indexes, vec![p([1, 2]), p([1, 3])]);
    assert_eq!(
        captions(&events[0].deselected_items),
        vec!["Node 1-2", "Node 1-3"]
    );
    assert_eq!(target.selected_indexes(), vec![p([3])]);
    assert_eq!(captions(&target.selected_items()), vec!["Node 4"]);
}

#[test]
fn test_removing_first_selected_item_changes_selected_item() {
    let data = create_data();
    let target = create_multi_target(data.clone());
    target.select(&p([0])).unwrap();
    target.select(&p([1])).unwrap();
    let properties = record_properties(&target);

    data.remove(0);

    assert_eq!(target.selected_index(), p([0]));
    assert_eq!(caption(target.selected_item()).as_deref(), Some("Node 1"));
    assert_eq!(count(&properties, SelectionProperty::SelectedIndex), 0);
    assert_eq!(count(&properties, SelectionProperty::SelectedItem), 1);
    assert_eq!(count(&properties, SelectionProperty::SelectedIndexes), 1);
    assert_eq!(count(&properties, SelectionProperty::SelectedItems), 1);
}

#[test]
fn test_removing_unselected_item_keeps_selected_item_quiet() {
    let data = create_data();
    let target = create_multi_target(data.clone());
    target.select(&p([0])).unwrap();
    target.select(&p([3])).unwrap();
    let properties = record_properties(&target);

    data.remove(1);

    assert_eq!(caption(target.selected_item()).as_deref(), Some("Node 0"));
    assert_eq!(count(&properties, SelectionProperty::SelectedItem), 0);
    assert_eq!(count(&properties, SelectionProperty::SelectedIndexes), 1);
}

#[test]
fn test_removing_item_before_selected_parent_shifts_nested_selection() {
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([3, 1])).unwrap();
    let events = record_events(&target);
    let properties = record_properties(&target);

    data.remove(0);

    assert!(events.lock().is_empty());
    assert_eq!(target.selected_index(), p([2, 1]));
    assert_eq!(caption(target.selected_item()).as_deref(), Some("Node 3-1"));
    assert_eq!(count(&properties, SelectionProperty::SelectedIndexes), 1);
}

#[test]
fn test_removing_range_reports_each_selected_item() {
    let data = create_data();
    let target = create_multi_target(data.clone());
    target.select_range(&p([1]), &p([3])).unwrap();
    let events = record_events(&target);

    data.remove_range(0, 3);

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].deselected_indexes, vec![p([1]), p([2])]);
    assert_eq!(captions(&events[0].deselected_items), vec!["Node 1", "Node 2"]);
    assert_eq!(target.selected_indexes(), vec![p([0])]);
    assert_eq!(captions(&target.selected_items()), vec!["Node 3"]);
}

#[test]
fn test_replacing_selected_item_deselects_it() {
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([2])).unwrap();
    let events = record_events(&target);

    data.replace(2, Node::new(p([2])));

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].deselected_indexes, vec![p([2])]);
    assert!(target.selected_index().is_empty());
}

// =============================================================================
// Reset
// =============================================================================

#[test]
fn test_resetting_child_list_deselects_its_items() {
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([1, 3])).unwrap();
    let events = record_events(&target);

    children_of(&data, 1).set_items(vec![Node::new(p([1, 0]))]);

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].deselected_indexes, vec![p([1, 3])]);
    assert_eq!(captions(&events[0].deselected_items), vec!["Node 1-3"]);
    assert!(!target.has_selection());
}

#[test]
fn test_resetting_roots_deselects_every_level() {
    let data = create_data();
    let target = create_multi_target(data.clone());
    target.select(&p([0])).unwrap();
    target.select(&p([2, 2])).unwrap();
    let events = record_events(&target);

    data.clear();

    {
        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].deselected_indexes, vec![p([0]), p([2, 2])]);
        assert_eq!(captions(&events[0].deselected_items), vec!["Node 0", "Node 2-2"]);
    }
    assert!(!target.has_selection());

    target.select(&p([0])).unwrap();
    assert!(!target.has_selection());

    data.set_items(create_data().to_vec());
    target.select(&p([0, 4])).unwrap();
    assert_eq!(target.selected_indexes(), vec![p([0, 4])]);
}

// =============================================================================
// Subscriptions and re-entrancy
// =============================================================================

#[test]
fn test_dropped_model_detaches_from_items_lists() {
    let data = create_data();
    let children = children_of(&data, 0);
    let target = create_target(data.clone());
    target.select(&p([0, 1])).unwrap();

    assert_eq!(data.signals().observer_count(), 1);
    assert_eq!(children.signals().observer_count(), 1);

    drop(target);

    assert_eq!(data.signals().observer_count(), 0);
    assert_eq!(children.signals().observer_count(), 0);
    data.push(Node::new(p([5])));
}

#[test]
fn test_cleared_selection_releases_child_lists() {
    let data = create_data();
    let children = children_of(&data, 1);
    let target = create_target(data.clone());
    target.select(&p([1, 2])).unwrap();
    target.clear();
    let events = record_events(&target);

    children.remove(0);

    assert_eq!(children.signals().observer_count(), 0);
    assert!(events.lock().is_empty());
    assert!(!target.has_selection());
}

#[test]
fn test_selection_changed_slot_can_update_selection() {
    let target = create_multi_target(create_data());

    let model = target.clone();
    target.selection_changed().connect(move |event| {
        if event.selected_indexes.contains(&IndexPath::from([0])) {
            model.select(&IndexPath::from([0, 0])).unwrap();
        }
    });
    let events = record_events(&target);

    target.select(&p([0])).unwrap();

    assert_eq!(events.lock().len(), 2);
    assert_eq!(target.selected_indexes(), vec![p([0]), p([0, 0])]);
}

#[test]
fn test_slot_connected_before_model_selects_inserted_item() {
    let data = ItemsList::view(Vec::new());

    // The binding exists before the model does.
    let binding: Arc<parking_lot::Mutex<Option<TreeSelectionModel<NodeRef>>>> = Arc::default();
    let binding_clone = binding.clone();
    data.signals().items_inserted.connect(move |_| {
        if let Some(model) = binding_clone.lock().clone() {
            model.select(&IndexPath::from([0])).unwrap();
        }
    });

    let target = create_target(data.clone());
    *binding.lock() = Some(target.clone());

    data.push(Node::new(p([0])));

    assert_eq!(target.selected_index(), p([0]));
    assert_eq!(target.selected_indexes(), vec![p([0])]);
}

#[test]
fn test_slot_connected_before_node_realized_selects_inserted_child() {
    let data = create_data();
    let children = children_of(&data, 0);
    let target = create_multi_target(data.clone());

    let model = target.clone();
    children.signals().items_inserted.connect(move |_| {
        model.select(&IndexPath::from([0, 0])).unwrap();
    });

    // Realizes the node for (0) after the slot above was connected.
    target.select(&p([0, 3])).unwrap();

    children.insert(0, Node::new(p([0, 99])));

    assert_eq!(target.selected_indexes(), vec![p([0, 0]), p([0, 4])]);
    assert_eq!(
        captions(&target.selected_items()),
        vec!["Node 0-99", "Node 0-3"]
    );
}

#[test]
fn test_slot_connected_before_set_roots_sees_shifted_selection() {
    let data = create_data();
    let target = create_target(create_data());

    let seen = Arc::new(parking_lot::Mutex::new(None));
    let model = target.clone();
    let seen_clone = seen.clone();
    data.signals().items_inserted.connect(move |_| {
        *seen_clone.lock() = Some(model.selected_index());
    });

    target.set_roots(data.clone());
    target.select(&p([2])).unwrap();
    data.insert(0, Node::new(p([99])));

    assert_eq!(*seen.lock(), Some(p([3])));
}

#[test]
fn test_items_slot_sees_shifted_selection() {
    let data = create_data();
    let target = create_target(data.clone());
    target.select(&p([0])).unwrap();

    let seen = Arc::new(parking_lot::Mutex::new(None));
    let model = target.clone();
    let seen_clone = seen.clone();
    data.signals().items_inserted.connect(move |_| {
        *seen_clone.lock() = Some(model.selected_index());
    });

    data.insert(0, Node::new(p([99])));

    assert_eq!(*seen.lock(), Some(p([1])));
}
