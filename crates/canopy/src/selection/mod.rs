//! Hierarchical selection.
//!
//! [`TreeSelectionModel`] is the entry point. The realized selection tree,
//! the per-operation change accumulator and the debug dump are internal.

mod config;
mod debug;
mod event;
mod model;
mod node;
mod operation;

pub use config::TreeSelectionConfig;
pub use event::{SelectionChangedEvent, SelectionProperty};
pub use model::TreeSelectionModel;
