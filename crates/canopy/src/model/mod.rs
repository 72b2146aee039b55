//! Tree addressing and data-source plumbing.
//!
//! - [`IndexPath`]: the address of an item in a tree
//! - [`IndexRange`], [`IndexRanges`], [`IndexPathRange`]: sibling and path spans
//! - [`ItemsList`] / [`ItemsView`]: observable child lists
//! - [`TreeSource`]: maps an item to its children

mod items;
mod path;
mod range;
mod source;

pub(crate) use items::ItemsChange;
pub use items::{ItemsList, ItemsSignals, ItemsView};
pub use path::IndexPath;
pub use range::{IndexPathRange, IndexRange, IndexRanges};
pub use source::{FlatSource, FnTreeSource, TreeSource};
