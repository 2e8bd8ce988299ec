use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::count::count_employees;
use crate::hierarchy::NodeRef;

/// Ids of nodes whose reports are hidden. The node itself always stays drawn.
///
/// Owned by the caller and tied to one tree; start from an empty set whenever the tree is rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollapseSet {
    collapsed: BTreeSet<String>,
}

impl CollapseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.collapsed.iter().map(String::as_str)
    }

    /// Flips one id. Returns whether it is collapsed afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.collapsed.remove(id) {
            false
        } else {
            self.collapsed.insert(id.to_string());
            true
        }
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    /// Collapses every node below `root` that has reports. `root` and leaves are skipped.
    pub fn collapse_all(&mut self, root: NodeRef<'_>) {
        let internal = root
            .preorder()
            .skip(1)
            .filter(|node| node.has_children())
            .filter_map(|node| node.id());
        self.collapsed.extend(internal.map(str::to_string));
        debug!(collapsed = self.collapsed.len(), "collapsed all");
    }

    /// Un-collapses the strict ancestors of `target_id`. Unknown targets change nothing.
    pub fn expand_path_to_node(&mut self, root: NodeRef<'_>, target_id: &str) -> bool {
        let Some(path) = root.path_to(target_id) else {
            debug!(target_id, "expand path: node not found");
            return false;
        };
        let ancestors = &path[..path.len() - 1];
        for id in ancestors.iter().filter_map(|node| node.id()) {
            self.collapsed.remove(id);
        }
        true
    }

    /// Like [`expand_path_to_node`](Self::expand_path_to_node), but also opens the target itself.
    pub fn reveal(&mut self, root: NodeRef<'_>, target_id: &str) -> bool {
        let found = self.expand_path_to_node(root, target_id);
        if found {
            self.collapsed.remove(target_id);
        }
        found
    }

    pub fn is_collapsed(&self, node: NodeRef<'_>) -> bool {
        node.id().is_some_and(|id| self.collapsed.contains(id))
    }

    /// Whether the reports of `node` are drawn.
    pub fn children_visible(&self, node: NodeRef<'_>) -> bool {
        !self.is_collapsed(node)
    }

    /// `ancestry` holds the strict ancestors of `node`, root first.
    pub fn is_visible(&self, _node: NodeRef<'_>, ancestry: &[NodeRef<'_>]) -> bool {
        !ancestry.iter().any(|ancestor| self.is_collapsed(*ancestor))
    }

    /// Descendants suppressed by `node`'s own collapse flag.
    pub fn hidden_count(&self, node: NodeRef<'_>) -> usize {
        if self.is_collapsed(node) && node.has_children() {
            count_employees(Some(node)) - 1
        } else {
            0
        }
    }

    /// Drawn nodes in pre-order.
    pub fn visible_nodes<'a>(&self, root: NodeRef<'a>) -> Vec<NodeRef<'a>> {
        let mut visible = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            visible.push(node);
            if self.children_visible(node) {
                let children: Vec<NodeRef<'a>> = node.children().collect();
                stack.extend(children.into_iter().rev());
            }
        }
        visible
    }
}
