//! Error types for the selection engine.

use thiserror::Error;

use crate::model::IndexPath;

/// Errors reported by selection operations.
///
/// Invalid paths are not errors: selecting an item that does not exist is a
/// no-op. Errors are reserved for internal inconsistencies between the
/// realized selection tree and the data it mirrors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    /// A node tracks more child slots than its items list holds, meaning a
    /// change to the list went unobserved.
    #[error("selection node {path} tracks {children} children but its items list holds {items}")]
    ChildrenOutOfSync {
        /// Path of the inconsistent node.
        path: IndexPath,
        /// Length of the node's child slot array.
        children: usize,
        /// Current length of the node's items list.
        items: usize,
    },
}

/// Result type for selection operations.
pub type Result<T> = std::result::Result<T, SelectionError>;
