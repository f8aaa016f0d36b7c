use crate::model::task::TaskNode;
use crate::ops::hierarchy::ProfileChecklist;

/// Render a profile checklist as nested markdown checkboxes, one `##`
/// section per timeline.
pub fn export_profile_markdown(checklist: &ProfileChecklist) -> String {
    let mut out = format!("# Checklist for {}\n\n", checklist.profile);
    for group in &checklist.groups {
        out.push_str(&format!("## {}\n\n", group.timeline));
        for node in &group.hierarchy() {
            write_item(&mut out, node, 0);
        }
        out.push('\n');
    }
    out
}

fn write_item(out: &mut String, node: &TaskNode<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{}- [ ] **{}**\n", indent, node.task.name));
    if !node.task.description.is_empty() {
        let quote = format!("\n{}  > ", indent);
        let body = node.task.description.replace('\n', &quote);
        out.push_str(&format!("{}  > {}\n", indent, body));
    }
    for child in &node.children {
        write_item(out, child, depth + 1);
    }
}
