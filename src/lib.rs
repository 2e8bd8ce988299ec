pub mod cli;
pub mod collapse;
pub mod config;
pub mod count;
pub mod error;
pub mod hierarchy;
pub mod record;
pub mod search;
pub mod view;

pub use collapse::CollapseSet;
pub use count::count_employees;
pub use error::OrgChartError;
pub use hierarchy::{
    BuildDiagnostics, BuildOptions, NodeIdx, NodeRef, OrgTree, RootPolicy, build_hierarchy, to_json_string, try_build_hierarchy,
};
pub use record::EmployeeRecord;
pub use search::{SearchSession, search_employees};

use cli::InfoLevel;

fn card_label(node: NodeRef<'_>, info_level: InfoLevel) -> String {
    let employee = node.employee();
    let mut label = employee.name.clone();

    if matches!(info_level, InfoLevel::L2 | InfoLevel::L3) {
        if let Some(title) = employee.title.as_deref().filter(|t| !t.is_empty()) {
            label.push_str(&format!(", {}", title));
        }
    }
    if info_level == InfoLevel::L3 {
        if let Some(department) = employee.department.as_deref().filter(|d| !d.is_empty()) {
            label.push_str(&format!(" [{}]", department));
        }
        if let Some(badge) = view::reports_badge(node.direct_reports()) {
            label.push_str(&format!(" ({})", badge));
        }
    }
    label
}

fn hidden_suffix(node: NodeRef<'_>, collapsed: &CollapseSet) -> String {
    match collapsed.hidden_count(node) {
        0 => String::new(),
        n => format!(" (+{} hidden)", n),
    }
}

/// One pending line: the node, the prefix inherited from its ancestors, and whether it is the last sibling.
type Branch<'a> = (NodeRef<'a>, String, bool);

fn push_branches<'a>(stack: &mut Vec<Branch<'a>>, node: NodeRef<'a>, collapsed: &CollapseSet, prefix: String) {
    if !collapsed.children_visible(node) {
        return;
    }
    let len = node.direct_reports();
    let children: Vec<NodeRef<'a>> = node.children().collect();
    for (i, child) in children.into_iter().enumerate().rev() {
        stack.push((child, prefix.clone(), i == len - 1));
    }
}

/// Draws the chart as an indented tree, honouring `collapsed`.
///
/// The root sits on the first line; collapsed managers end with `(+N hidden)`.
pub fn render_tree(root: NodeRef<'_>, collapsed: &CollapseSet, info_level: InfoLevel) -> String {
    let mut out = format!("{}{}\n", card_label(root, info_level), hidden_suffix(root, collapsed));
    let mut stack = Vec::new();
    push_branches(&mut stack, root, collapsed, String::new());

    while let Some((node, prefix, is_last)) = stack.pop() {
        let connector = if is_last { "└── " } else { "├── " };
        out.push_str(&format!(
            "{}{}{}{}\n",
            prefix,
            connector,
            card_label(node, info_level),
            hidden_suffix(node, collapsed)
        ));

        let new_prefix = if is_last {
            format!("{}    ", prefix)
        } else {
            format!("{}│   ", prefix)
        };
        push_branches(&mut stack, node, collapsed, new_prefix);
    }
    out
}

pub fn print_tree(root: NodeRef<'_>, collapsed: &CollapseSet, info_level: InfoLevel) {
    print!("{}", render_tree(root, collapsed, info_level));
}
