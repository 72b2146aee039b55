//! Construction options for [`TreeSelectionModel`](super::TreeSelectionModel).

/// Options for a new selection model.
///
/// # Example
///
/// ```
/// use canopy::selection::TreeSelectionConfig;
///
/// let config = TreeSelectionConfig::default()
///     .with_single_select(false)
///     .with_prune_on_clear(false);
/// assert!(!config.single_select);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSelectionConfig {
    /// Start in single-select mode.
    pub single_select: bool,
    /// Release realized selection nodes when the selection is cleared.
    pub prune_on_clear: bool,
}

impl Default for TreeSelectionConfig {
    fn default() -> Self {
        Self {
            single_select: true,
            prune_on_clear: true,
        }
    }
}

impl TreeSelectionConfig {
    /// Options for a model that allows several selected items.
    pub fn multiple() -> Self {
        Self {
            single_select: false,
            ..Default::default()
        }
    }

    pub fn with_single_select(mut self, single_select: bool) -> Self {
        self.single_select = single_select;
        self
    }

    pub fn with_prune_on_clear(mut self, prune_on_clear: bool) -> Self {
        self.prune_on_clear = prune_on_clear;
        self
    }
}
