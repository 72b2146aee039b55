//! Shared fixture: five top-level nodes, each with five leaf children.
//!
//! Node captions follow their creation path, e.g. `"Node 0-2"`. Children are
//! created on first request and then reused, so changes made through a
//! node's child list are seen by the selection model.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use canopy::prelude::*;
use parking_lot::Mutex;

pub type NodeRef = Arc<Node>;

#[derive(Debug)]
pub struct Node {
    pub id: IndexPath,
    pub caption: String,
    children: OnceLock<Option<ItemsView<NodeRef>>>,
}

impl Node {
    pub fn new(id: IndexPath) -> NodeRef {
        let caption = format!(
            "Node {}",
            id.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("-")
        );
        Arc::new(Self {
            id,
            caption,
            children: OnceLock::new(),
        })
    }

    /// The node's child list; only the first two levels have children.
    pub fn children(&self) -> Option<ItemsView<NodeRef>> {
        self.children
            .get_or_init(|| (self.id.len() < 2).then(|| create_nodes(&self.id)))
            .clone()
    }
}

pub fn create_nodes(parent: &IndexPath) -> ItemsView<NodeRef> {
    ItemsList::view((0..5).map(|i| Node::new(parent.child(i))).collect())
}

pub fn create_data() -> ItemsView<NodeRef> {
    create_nodes(&IndexPath::empty())
}

pub fn source() -> impl TreeSource<NodeRef> {
    FnTreeSource::new(|node: &NodeRef| node.children())
}

/// A single-select model over `data`.
pub fn create_target(data: ItemsView<NodeRef>) -> TreeSelectionModel<NodeRef> {
    TreeSelectionModel::new(data, source())
}

/// A multiple-select model over `data`.
pub fn create_multi_target(data: ItemsView<NodeRef>) -> TreeSelectionModel<NodeRef> {
    TreeSelectionModel::with_config(data, source(), TreeSelectionConfig::multiple())
}

pub fn p<const N: usize>(indexes: [usize; N]) -> IndexPath {
    IndexPath::from(indexes)
}

pub fn captions(items: &[NodeRef]) -> Vec<&str> {
    items.iter().map(|node| node.caption.as_str()).collect()
}

pub fn caption(item: Option<NodeRef>) -> Option<String> {
    item.map(|node| node.caption.clone())
}

pub type Events = Arc<Mutex<Vec<SelectionChangedEvent<NodeRef>>>>;
pub type Properties = Arc<Mutex<Vec<SelectionProperty>>>;

pub fn record_events(model: &TreeSelectionModel<NodeRef>) -> Events {
    let events = Events::default();
    let events_clone = events.clone();
    model.selection_changed().connect(move |event| {
        events_clone.lock().push(event.clone());
    });
    events
}

pub fn record_properties(model: &TreeSelectionModel<NodeRef>) -> Properties {
    let properties = Properties::default();
    let properties_clone = properties.clone();
    model.property_changed().connect(move |property| {
        properties_clone.lock().push(*property);
    });
    properties
}

/// Counts notifications for one property.
pub fn count(properties: &Properties, property: SelectionProperty) -> usize {
    properties.lock().iter().filter(|p| **p == property).count()
}

/// Installs a test log subscriber, once per test binary.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("canopy=trace"))
        .with_test_writer()
        .try_init();
}
