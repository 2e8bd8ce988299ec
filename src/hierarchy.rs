use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::OrgChartError;
use crate::record::EmployeeRecord;

/// Which candidate becomes the root when several records have no manager.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RootPolicy {
    #[default]
    LastWins,
    FirstWins,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub root_policy: RootPolicy,
}

/// Position of a node inside an [`OrgTree`]. Only meaningful for the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

impl NodeIdx {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub employee: EmployeeRecord,
    children: Vec<NodeIdx>,
    depth: usize,
    subtree_size: usize,
}

/// A record that did not make it into the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedRecord {
    pub position: usize,
    pub id: Option<String>,
    pub manager_id: Option<String>,
    pub name: String,
}

impl ExcludedRecord {
    fn from_record(position: usize, record: &EmployeeRecord) -> Self {
        Self {
            position,
            id: record.id.clone(),
            manager_id: record.manager_id.clone(),
            name: record.name.clone(),
        }
    }
}

impl fmt::Display for ExcludedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id {}, manager {}, record #{})",
            self.name,
            self.id.as_deref().unwrap_or("-"),
            self.manager_id.as_deref().unwrap_or("-"),
            self.position + 1
        )
    }
}

/// Data quality findings from one build. Each excluded record is listed exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDiagnostics {
    /// Manager id does not resolve to any record.
    pub orphans: Vec<ExcludedRecord>,
    /// Replaced in the index by a later record with the same id.
    pub duplicate_ids: Vec<ExcludedRecord>,
    /// Qualified as root but lost to another candidate.
    pub superseded_roots: Vec<ExcludedRecord>,
    /// Manager resolved, but the chain never reaches the root.
    pub detached: Vec<ExcludedRecord>,
}

impl BuildDiagnostics {
    pub fn excluded_count(&self) -> usize {
        self.orphans.len() + self.duplicate_ids.len() + self.superseded_roots.len() + self.detached.len()
    }

    pub fn is_clean(&self) -> bool {
        self.excluded_count() == 0
    }

    pub fn has_ambiguous_root(&self) -> bool {
        !self.superseded_roots.is_empty()
    }
}

/// Immutable snapshot of the hierarchy. Nodes are stored in pre-order, root first.
#[derive(Debug, Clone)]
pub struct OrgTree {
    nodes: Vec<TreeNode>,
    index: HashMap<String, NodeIdx>,
    diagnostics: BuildDiagnostics,
}

impl OrgTree {
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { tree: self, idx: NodeIdx(0) }
    }

    pub fn node(&self, idx: NodeIdx) -> Option<NodeRef<'_>> {
        (idx.0 < self.nodes.len()).then_some(NodeRef { tree: self, idx })
    }

    /// Identifier lookup.
    pub fn get(&self, id: &str) -> Option<NodeRef<'_>> {
        self.index.get(id).map(|&idx| NodeRef { tree: self, idx })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every node in pre-order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| NodeRef { tree: self, idx: NodeIdx(i) })
    }

    pub fn diagnostics(&self) -> &BuildDiagnostics {
        &self.diagnostics
    }

    fn tree_node(&self, idx: NodeIdx) -> &TreeNode {
        &self.nodes[idx.0]
    }
}

/// Borrowed handle to one node of an [`OrgTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a OrgTree,
    idx: NodeIdx,
}

impl<'a> NodeRef<'a> {
    pub fn idx(&self) -> NodeIdx {
        self.idx
    }

    pub fn tree(&self) -> &'a OrgTree {
        self.tree
    }

    pub fn employee(&self) -> &'a EmployeeRecord {
        &self.tree.tree_node(self.idx).employee
    }

    pub fn id(&self) -> Option<&'a str> {
        self.employee().id.as_deref()
    }

    pub fn name(&self) -> &'a str {
        &self.employee().name
    }

    pub fn depth(&self) -> usize {
        self.tree.tree_node(self.idx).depth
    }

    /// Node itself plus all descendants.
    pub fn subtree_size(&self) -> usize {
        self.tree.tree_node(self.idx).subtree_size
    }

    pub fn has_children(&self) -> bool {
        !self.tree.tree_node(self.idx).children.is_empty()
    }

    pub fn direct_reports(&self) -> usize {
        self.tree.tree_node(self.idx).children.len()
    }

    pub fn child(&self, position: usize) -> Option<NodeRef<'a>> {
        let tree = self.tree;
        tree.tree_node(self.idx)
            .children
            .get(position)
            .map(|&idx| NodeRef { tree, idx })
    }

    /// Direct reports in input order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        tree.tree_node(self.idx)
            .children
            .iter()
            .map(move |&idx| NodeRef { tree, idx })
    }

    /// This node followed by its descendants, node before children.
    pub fn preorder(&self) -> Preorder<'a> {
        Preorder { stack: vec![*self] }
    }

    /// Root-to-target chain, target last. The first pre-order match wins.
    pub fn path_to(&self, target_id: &str) -> Option<Vec<NodeRef<'a>>> {
        let mut path = vec![*self];
        if self.id() == Some(target_id) {
            return Some(path);
        }
        // next child to visit for each entry on `path`
        let mut cursors = vec![0usize];

        while let (Some(node), Some(cursor)) = (path.last().copied(), cursors.last_mut()) {
            match node.child(*cursor) {
                Some(child) => {
                    *cursor += 1;
                    path.push(child);
                    if child.id() == Some(target_id) {
                        return Some(path);
                    }
                    cursors.push(0);
                }
                None => {
                    path.pop();
                    cursors.pop();
                }
            }
        }
        None
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.idx == other.idx
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("idx", &self.idx.0)
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

/// Nested JSON for the subtree at `root`: the record's fields plus `children`.
///
/// Written with an explicit stack, so arbitrarily deep chains do not exhaust the thread stack.
pub fn to_json_string(root: NodeRef<'_>) -> Result<String, serde_json::Error> {
    enum Step<'a> {
        Open { node: NodeRef<'a>, first: bool },
        Close,
    }

    let mut out = String::new();
    let mut stack = vec![Step::Open { node: root, first: true }];
    while let Some(step) = stack.pop() {
        match step {
            Step::Close => out.push_str("]}"),
            Step::Open { node, first } => {
                if !first {
                    out.push(',');
                }
                // reopen the record's object to append `children`
                let fields = serde_json::to_string(node.employee())?;
                let body = fields.strip_suffix('}').unwrap_or(&fields);
                out.push_str(body);
                if body != "{" {
                    out.push(',');
                }
                out.push_str("\"children\":[");

                stack.push(Step::Close);
                let children: Vec<NodeRef<'_>> = node.children().collect();
                for (i, child) in children.into_iter().enumerate().rev() {
                    stack.push(Step::Open { node: child, first: i == 0 });
                }
            }
        }
    }
    Ok(out)
}

pub struct Preorder<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children = &node.tree.tree_node(node.idx).children;
        self.stack
            .extend(children.iter().rev().map(|&idx| NodeRef { tree: node.tree, idx }));
        Some(node)
    }
}

/// Sentinel form: `None` means "no data available" (empty input or no root).
pub fn build_hierarchy(records: &[EmployeeRecord]) -> Option<OrgTree> {
    try_build_hierarchy(records, &BuildOptions::default()).ok()
}

pub fn try_build_hierarchy(records: &[EmployeeRecord], options: &BuildOptions) -> Result<OrgTree, OrgChartError> {
    if records.is_empty() {
        info!("No employees provided to build_hierarchy");
        return Err(OrgChartError::MissingInput);
    }
    info!(records = records.len(), "building hierarchy");

    // First pass: canonical copies and the id lookup. Later duplicates replace earlier ones.
    let employees: Vec<EmployeeRecord> = records.iter().map(EmployeeRecord::normalized).collect();
    let mut lookup: HashMap<String, usize> = HashMap::with_capacity(employees.len());
    for (pos, employee) in employees.iter().enumerate() {
        if let Some(id) = &employee.id {
            lookup.insert(id.clone(), pos);
        }
    }

    let mut diagnostics = BuildDiagnostics::default();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); employees.len()];
    let mut root: Option<usize> = None;
    let mut candidates: Vec<usize> = Vec::new();

    // Second pass, input order: elect the root and attach everyone else to their manager.
    for (pos, employee) in employees.iter().enumerate() {
        if let Some(id) = employee.id.as_deref() {
            if lookup.get(id) != Some(&pos) {
                warn!(id, name = %employee.name, "duplicate employee id, keeping the later record");
                diagnostics.duplicate_ids.push(ExcludedRecord::from_record(pos, employee));
                continue;
            }
        }

        match employee.manager_id.as_deref() {
            Some(manager) if employee.id.as_deref() != Some(manager) => match lookup.get(manager) {
                Some(&manager_pos) => {
                    debug!(name = %employee.name, manager = %employees[manager_pos].name, "attached to manager");
                    children[manager_pos].push(pos);
                }
                None => {
                    warn!(name = %employee.name, manager, "manager not found, dropping orphan");
                    diagnostics.orphans.push(ExcludedRecord::from_record(pos, employee));
                }
            },
            _ => {
                debug!(name = %employee.name, "root candidate");
                candidates.push(pos);
                root = match (options.root_policy, root) {
                    (RootPolicy::FirstWins, Some(current)) => Some(current),
                    _ => Some(pos),
                };
            }
        }
    }

    let Some(root) = root else {
        warn!(records = records.len(), "no root employee found");
        return Err(OrgChartError::NoRoot { records: records.len() });
    };

    for &pos in candidates.iter().filter(|&&pos| pos != root) {
        warn!(name = %employees[pos].name, root = %employees[root].name, "several root candidates, ignoring one");
        diagnostics.superseded_roots.push(ExcludedRecord::from_record(pos, &employees[pos]));
    }

    let tree = freeze(employees, &children, root, diagnostics);
    info!(
        root = %tree.root().name(),
        nodes = tree.node_count(),
        excluded = tree.diagnostics.excluded_count(),
        "hierarchy built"
    );
    Ok(tree)
}

/// Lays the reachable part out in pre-order and records whatever was left behind.
fn freeze(employees: Vec<EmployeeRecord>, children: &[Vec<usize>], root: usize, mut diagnostics: BuildDiagnostics) -> OrgTree {
    let mut placed: Vec<Option<usize>> = vec![None; employees.len()];
    let mut order: Vec<(usize, usize)> = Vec::with_capacity(employees.len());
    let mut stack = vec![(root, 0usize)];

    while let Some((pos, depth)) = stack.pop() {
        placed[pos] = Some(order.len());
        order.push((pos, depth));
        stack.extend(children[pos].iter().rev().map(|&child| (child, depth + 1)));
    }

    let mut slots: Vec<Option<EmployeeRecord>> = employees.into_iter().map(Some).collect();

    let mut excluded = vec![false; slots.len()];
    for record in diagnostics
        .orphans
        .iter()
        .chain(&diagnostics.duplicate_ids)
        .chain(&diagnostics.superseded_roots)
    {
        excluded[record.position] = true;
    }
    for (pos, slot) in slots.iter().enumerate() {
        if let Some(employee) = slot {
            if placed[pos].is_none() && !excluded[pos] {
                warn!(name = %employee.name, "manager chain never reaches the root, record detached");
                diagnostics.detached.push(ExcludedRecord::from_record(pos, employee));
            }
        }
    }

    let mut nodes: Vec<TreeNode> = Vec::with_capacity(order.len());
    let mut index = HashMap::with_capacity(order.len());
    for &(pos, depth) in &order {
        let Some(employee) = slots[pos].take() else {
            continue;
        };
        if let Some(id) = &employee.id {
            index.insert(id.clone(), NodeIdx(nodes.len()));
        }
        nodes.push(TreeNode {
            employee,
            children: children[pos].iter().filter_map(|&c| placed[c]).map(NodeIdx).collect(),
            depth,
            subtree_size: 1,
        });
    }

    // Children always sit after their parent in pre-order.
    for i in (0..nodes.len()).rev() {
        let below: usize = nodes[i].children.iter().map(|c| nodes[c.0].subtree_size).sum();
        nodes[i].subtree_size += below;
    }

    OrgTree { nodes, index, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, manager: Option<&str>, name: &str) -> EmployeeRecord {
        EmployeeRecord::new(Some(id), manager, name)
    }

    fn names<'a>(nodes: impl Iterator<Item = NodeRef<'a>>) -> Vec<&'a str> {
        nodes.map(|n| n.name()).collect()
    }

    #[test]
    fn test_empty_input_has_no_tree() {
        assert!(build_hierarchy(&[]).is_none());
        let err = try_build_hierarchy(&[], &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, OrgChartError::MissingInput));
    }

    #[test]
    fn test_simple_chain() {
        let records = vec![
            rec("1", None, "Alice"),
            rec("2", Some("1"), "Bob"),
            rec("3", Some("2"), "Carol"),
        ];
        let tree = build_hierarchy(&records).unwrap();
        let root = tree.root();

        assert_eq!(root.name(), "Alice");
        assert_eq!(names(root.children()), vec!["Bob"]);
        assert_eq!(names(root.child(0).unwrap().children()), vec!["Carol"]);
        assert_eq!(tree.get("3").unwrap().depth(), 2);
        assert!(tree.diagnostics().is_clean());
    }

    #[test]
    fn test_children_keep_input_order() {
        // reports listed before their manager still attach in input order
        let records = vec![
            rec("c", Some("a"), "Carl"),
            rec("a", None, "Ann"),
            rec("b", Some("a"), "Ben"),
            rec("d", Some("a"), "Dora"),
        ];
        let tree = build_hierarchy(&records).unwrap();
        assert_eq!(names(tree.root().children()), vec!["Carl", "Ben", "Dora"]);
    }

    #[test]
    fn test_self_managed_and_literal_null_are_roots() {
        let tree = build_hierarchy(&[rec("1", Some("1"), "Self"), rec("2", Some("1"), "Report")]).unwrap();
        assert_eq!(tree.root().name(), "Self");
        assert_eq!(tree.node_count(), 2);

        let tree = build_hierarchy(&[rec("1", Some("null"), "Null"), rec("2", Some("undefined"), "Undef")]).unwrap();
        assert_eq!(tree.root().name(), "Undef");
    }

    #[test]
    fn test_no_root_is_distinct_from_missing_input() {
        let records = vec![rec("1", Some("2"), "A"), rec("2", Some("1"), "B")];
        assert!(build_hierarchy(&records).is_none());
        let err = try_build_hierarchy(&records, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, OrgChartError::NoRoot { records: 2 }));
        assert!(err.is_empty_chart());
    }

    #[test]
    fn test_orphans_are_excluded_and_reported() {
        let records = vec![
            rec("1", None, "Alice"),
            rec("2", Some("99"), "Lost"),
            rec("3", Some("2"), "UnderLost"),
        ];
        let tree = build_hierarchy(&records).unwrap();

        assert_eq!(tree.node_count(), 1);
        assert!(tree.get("2").is_none());
        let diagnostics = tree.diagnostics();
        assert_eq!(diagnostics.orphans.len(), 1);
        assert_eq!(diagnostics.orphans[0].id.as_deref(), Some("2"));
        assert_eq!(diagnostics.detached.len(), 1);
        assert_eq!(diagnostics.detached[0].name, "UnderLost");
    }

    #[test]
    fn test_root_policy() {
        let records = vec![
            rec("1", None, "First"),
            rec("2", Some("1"), "FirstReport"),
            rec("3", None, "Second"),
        ];
        let last = build_hierarchy(&records).unwrap();
        assert_eq!(last.root().name(), "Second");
        assert!(last.diagnostics().has_ambiguous_root());
        assert_eq!(last.diagnostics().superseded_roots[0].name, "First");
        assert_eq!(last.diagnostics().detached[0].name, "FirstReport");

        let options = BuildOptions { root_policy: RootPolicy::FirstWins };
        let first = try_build_hierarchy(&records, &options).unwrap();
        assert_eq!(first.root().name(), "First");
        assert_eq!(first.node_count(), 2);
        assert_eq!(first.diagnostics().superseded_roots[0].name, "Second");
    }

    #[test]
    fn test_duplicate_ids_keep_last_record() {
        let records = vec![
            rec("1", None, "Alice"),
            rec("2", Some("1"), "Bob"),
            rec("2", Some("1"), "Bobby"),
            rec("3", Some("2"), "Carol"),
        ];
        let tree = build_hierarchy(&records).unwrap();

        assert_eq!(names(tree.root().children()), vec!["Bobby"]);
        assert_eq!(tree.get("2").unwrap().name(), "Bobby");
        assert_eq!(names(tree.get("2").unwrap().children()), vec!["Carol"]);
        assert_eq!(tree.diagnostics().duplicate_ids[0].name, "Bob");
    }

    #[test]
    fn test_absent_ids_do_not_collide() {
        let records = vec![
            rec("1", None, "Alice"),
            EmployeeRecord::new(None, Some("1"), "Anon1"),
            EmployeeRecord::new(Some("null"), Some("1"), "Anon2"),
        ];
        let tree = build_hierarchy(&records).unwrap();
        assert_eq!(names(tree.root().children()), vec!["Anon1", "Anon2"]);
        assert_eq!(tree.root().child(1).unwrap().id(), None);
    }

    #[test]
    fn test_preorder_and_subtree_sizes() {
        let records = vec![
            rec("A", None, "A"),
            rec("B", Some("A"), "B"),
            rec("C", Some("B"), "C"),
            rec("D", Some("A"), "D"),
            rec("E", Some("B"), "E"),
        ];
        let tree = build_hierarchy(&records).unwrap();

        assert_eq!(names(tree.root().preorder()), vec!["A", "B", "C", "E", "D"]);
        assert_eq!(names(tree.iter()), vec!["A", "B", "C", "E", "D"]);
        assert_eq!(tree.root().subtree_size(), 5);
        assert_eq!(tree.get("B").unwrap().subtree_size(), 3);
        assert_eq!(tree.get("D").unwrap().subtree_size(), 1);
    }

    #[test]
    fn test_path_to() {
        let records = vec![
            rec("A", None, "A"),
            rec("B", Some("A"), "B"),
            rec("C", Some("B"), "C"),
            rec("D", Some("A"), "D"),
        ];
        let tree = build_hierarchy(&records).unwrap();
        let path = tree.root().path_to("C").unwrap();
        assert_eq!(names(path.into_iter()), vec!["A", "B", "C"]);
        assert_eq!(tree.root().path_to("A").unwrap().len(), 1);
        assert!(tree.root().path_to("Z").is_none());
        assert!(tree.get("D").unwrap().path_to("C").is_none());
    }

    #[test]
    fn test_build_does_not_mutate_input() {
        let records = vec![rec("1", Some("null"), "Alice")];
        let snapshot = records.clone();
        let _ = build_hierarchy(&records);
        assert_eq!(records, snapshot);
    }

    #[test]
    fn test_serializes_nested_children() {
        let records = vec![rec("1", None, "Alice"), rec("2", Some("1"), "Bob")];
        let tree = build_hierarchy(&records).unwrap();
        let value: serde_json::Value = serde_json::from_str(&to_json_string(tree.root()).unwrap()).unwrap();
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["children"][0]["name"], "Bob");
        assert_eq!(value["children"][0]["managerId"], "1");
        assert_eq!(value["children"][0]["children"], serde_json::json!([]));
    }

    #[test]
    fn test_serializes_deep_chain() {
        let depth = 50_000;
        let mut records = vec![rec("0", None, "E0")];
        records.extend((1..depth).map(|i| {
            EmployeeRecord::new(Some(i.to_string().as_str()), Some((i - 1).to_string().as_str()), "E")
        }));
        let tree = build_hierarchy(&records).unwrap();

        let json = to_json_string(tree.root()).unwrap();
        assert!(json.starts_with(r#"{"id":"0","managerId":null,"name":"E0","children":[{"id":"1""#));
        assert!(json.ends_with(&"]}".repeat(depth)));
        assert_eq!(json.matches("\"children\":[").count(), depth);
    }

    #[test]
    fn test_manager_cycle_beside_root_is_detached() {
        let records = vec![
            rec("R", None, "Root"),
            rec("X", Some("Y"), "X"),
            rec("Y", Some("X"), "Y"),
            rec("Z", Some("R"), "Z"),
        ];
        let tree = build_hierarchy(&records).unwrap();
        let diagnostics = tree.diagnostics();

        assert_eq!(names(tree.iter()), vec!["Root", "Z"]);
        let detached: Vec<&str> = diagnostics.detached.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(detached, vec!["X", "Y"]);
        assert!(diagnostics.orphans.is_empty());
        assert!(diagnostics.duplicate_ids.is_empty());
        assert!(diagnostics.superseded_roots.is_empty());
        assert!(tree.get("X").is_none() && tree.get("Y").is_none());
        assert_eq!(
            crate::count::count_employees(Some(tree.root())),
            records.len() - diagnostics.excluded_count()
        );
    }
}
