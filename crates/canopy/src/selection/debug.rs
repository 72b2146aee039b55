//! Textual dumps of the realized selection tree.

use std::fmt::Write as _;

use canopy_core::TreeFormatOptions;

use super::node::{NodeId, SelectionTree};

/// Renders a [`SelectionTree`] one realized node per line.
///
/// ```text
/// () items=5 selected=[1]
/// ├── [0] (0) items=5 selected=[2..=3]
/// └── [4] (4) items=5 selected=[]
/// ```
pub(crate) struct SelectionTreeDebug<'a> {
    options: &'a TreeFormatOptions,
}

impl<'a> SelectionTreeDebug<'a> {
    pub(crate) fn new(options: &'a TreeFormatOptions) -> Self {
        Self { options }
    }

    pub(crate) fn format<T: Clone + Send + Sync + 'static>(&self, tree: &SelectionTree<T>) -> String {
        let mut output = String::new();
        self.format_node(tree, tree.root(), None, 0, true, &mut output);
        output
    }

    fn format_node<T: Clone + Send + Sync + 'static>(
        &self,
        tree: &SelectionTree<T>,
        id: NodeId,
        slot: Option<usize>,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let Some(node) = tree.node(id) else {
            return;
        };

        output.push_str(&canopy_core::logging::tree_prefix(self.options, depth, is_last));
        if let Some(slot) = slot {
            let _ = write!(output, "[{slot}] ");
        }
        let _ = write!(output, "{}", node.path());
        if self.options.show_details {
            match node.items() {
                Some(items) => {
                    let _ = write!(output, " items={}", items.len());
                }
                None => output.push_str(" items=-"),
            }
            let _ = write!(output, " selected={}", node.ranges());
        }
        output.push('\n');

        let children: Vec<(usize, NodeId)> = node.children().collect();
        let last = children.len().saturating_sub(1);
        for (position, (slot, child)) in children.into_iter().enumerate() {
            self.format_node(tree, child, Some(slot), depth + 1, position == last, output);
        }
    }
}
