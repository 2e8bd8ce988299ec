use tracing::debug;

use crate::hierarchy::{NodeIdx, NodeRef, OrgTree};
use crate::record::EmployeeRecord;

/// Case-insensitive substring search over name, title and department.
///
/// Results come back in pre-order starting at `root`. An empty query matches every node.
pub fn search_employees<'a>(root: NodeRef<'a>, query: &str) -> Vec<NodeRef<'a>> {
    let term = query.to_lowercase();
    let results: Vec<NodeRef<'a>> = root
        .preorder()
        .filter(|node| matches_term(node.employee(), &term))
        .collect();
    debug!(query, matches = results.len(), "search finished");
    results
}

fn matches_term(employee: &EmployeeRecord, term: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(term);

    contains(&employee.name)
        || employee.title.as_deref().is_some_and(contains)
        || employee.department.as_deref().is_some_and(contains)
}

/// Toolbar search state: the term, its hits and which hit is highlighted.
///
/// Holds [`NodeIdx`] handles, so a session must be rerun when the tree is replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSession {
    term: String,
    results: Vec<NodeIdx>,
    current: usize,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A blank term clears the search instead of matching everyone.
    pub fn run(tree: &OrgTree, term: &str) -> Self {
        if term.trim().is_empty() {
            return Self {
                term: term.to_string(),
                ..Self::default()
            };
        }

        Self {
            term: term.to_string(),
            results: search_employees(tree.root(), term).iter().map(NodeRef::idx).collect(),
            current: 0,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn results<'a>(&'a self, tree: &'a OrgTree) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.results.iter().filter_map(move |&idx| tree.node(idx))
    }

    pub fn highlighted(&self) -> Option<NodeIdx> {
        self.results.get(self.current).copied()
    }

    pub fn next_result(&mut self) -> Option<NodeIdx> {
        if self.results.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.results.len();
        self.highlighted()
    }

    pub fn prev_result(&mut self) -> Option<NodeIdx> {
        if self.results.is_empty() {
            return None;
        }
        self.current = if self.current == 0 { self.results.len() - 1 } else { self.current - 1 };
        self.highlighted()
    }

    /// Jump straight to a hit, e.g. from the dropdown. Out of range leaves the cursor alone.
    pub fn select(&mut self, index: usize) -> Option<NodeIdx> {
        if index >= self.results.len() {
            return None;
        }
        self.current = index;
        self.highlighted()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn summary(&self) -> String {
        match self.results.len() {
            1 => "1 result found".to_string(),
            n => format!("{} results found", n),
        }
    }

    /// One-based cursor position, e.g. `2 / 5`.
    pub fn position(&self) -> String {
        if self.results.is_empty() {
            return "0 / 0".to_string();
        }
        format!("{} / {}", self.current + 1, self.results.len())
    }
}
