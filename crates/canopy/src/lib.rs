//! Canopy: hierarchical multi-selection for lazily loaded tree views.
//!
//! Canopy keeps track of which items of a tree are selected without loading
//! the tree. Items are addressed by [`IndexPath`]; per-level selections are
//! stored as index ranges; and selection nodes are realized only where a
//! selection needs them. When the underlying data changes, the stored paths
//! follow it.
//!
//! # Modules
//!
//! - [`model`]: paths, ranges, observable item lists and tree sources
//! - [`selection`]: the selection model and its notifications
//! - [`error`]: error types
//!
//! # Example
//!
//! ```
//! use canopy::prelude::*;
//!
//! let roots = ItemsList::view(vec!["fruit".to_string(), "veg".to_string()]);
//! let source = FnTreeSource::new(|item: &String| match item.as_str() {
//!     "fruit" => Some(ItemsList::view(vec!["apple".to_string(), "pear".to_string()])),
//!     _ => None,
//! });
//!
//! let model = TreeSelectionModel::new(roots, source);
//! model.select(&IndexPath::from([0, 1])).unwrap();
//!
//! assert_eq!(model.selected_item().as_deref(), Some("pear"));
//! ```
//!
//! # Logging
//!
//! Canopy logs through `tracing` under the `canopy::selection` and
//! `canopy::items` targets (see [`canopy_core::logging::targets`]).

pub mod error;
pub mod model;
pub mod selection;

pub use error::{Result, SelectionError};

/// Commonly used types.
pub mod prelude {
    pub use crate::error::{Result, SelectionError};
    pub use crate::model::{
        FlatSource, FnTreeSource, IndexPath, IndexPathRange, IndexRange, ItemsList, ItemsView,
        TreeSource,
    };
    pub use crate::selection::{
        SelectionChangedEvent, SelectionProperty, TreeSelectionConfig, TreeSelectionModel,
    };
}
