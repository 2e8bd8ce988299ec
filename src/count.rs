use crate::hierarchy::NodeRef;

/// Size of the subtree rooted at `node`, the node included. `None` counts as zero.
///
/// Walks the subtree with [`NodeRef::preorder`], so depth is bounded by memory, not by the call stack.
pub fn count_employees(node: Option<NodeRef<'_>>) -> usize {
    node.map_or(0, |node| node.preorder().count())
}

/// Same value as [`count_employees`], read from the size cached when the tree was frozen.
pub fn subtree_count(node: NodeRef<'_>) -> usize {
    node.subtree_size()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collapse::CollapseSet;
    use crate::hierarchy::build_hierarchy;
    use crate::record::EmployeeRecord;

    #[test]
    fn test_count_none_is_zero() {
        assert_eq!(count_employees(None), 0);
    }

    #[test]
    fn test_count_matches_cached_size() {
        let records = vec![
            EmployeeRecord::new(Some("1"), None, "Alice"),
            EmployeeRecord::new(Some("2"), Some("1"), "Bob"),
            EmployeeRecord::new(Some("3"), Some("2"), "Carol"),
            EmployeeRecord::new(Some("4"), Some("1"), "Dan"),
            EmployeeRecord::new(Some("5"), Some("404"), "Orphan"),
        ];
        let tree = build_hierarchy(&records).unwrap();

        assert_eq!(count_employees(Some(tree.root())), 4);
        assert_eq!(
            count_employees(Some(tree.root())),
            records.len() - tree.diagnostics().excluded_count()
        );
        for node in tree.iter() {
            assert_eq!(count_employees(Some(node)), subtree_count(node));
        }
    }

    #[test]
    fn test_count_deep_chain() {
        let depth = 200_000;
        let records: Vec<EmployeeRecord> = (0..depth)
            .map(|i| {
                let manager = (i > 0).then(|| (i - 1).to_string());
                EmployeeRecord::new(Some(i.to_string().as_str()), manager.as_deref(), "E")
            })
            .collect();
        let tree = build_hierarchy(&records).unwrap();
        let root = tree.root();

        assert_eq!(count_employees(Some(root)), depth);
        assert_eq!(subtree_count(root), depth);

        let mut collapsed = CollapseSet::new();
        collapsed.toggle("0");
        assert_eq!(collapsed.hidden_count(root), depth - 1);
    }
}
