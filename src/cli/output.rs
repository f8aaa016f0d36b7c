use serde::Serialize;

use crate::model::project::ProjectData;
use crate::model::task::{Task, TaskNode};
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::hierarchy::ProfileChecklist;
use crate::ops::task_ops::{DropPosition, MoveOutcome};
use crate::templates::Template;
use crate::util::unicode::{display_width, first_line, pad_to_width, truncate_to_width};

/// Names wider than this are cut in tree listings
const NAME_COLUMN_MAX: usize = 48;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct AddedJson {
    pub id: String,
    pub level: u8,
    pub order: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Serialize)]
pub struct DeletedJson {
    pub deleted: Vec<String>,
}

#[derive(Serialize)]
pub struct MovedJson {
    pub id: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub parent_id: Option<String>,
    pub level: u8,
    pub order: f64,
    pub relevelled: usize,
}

#[derive(Serialize)]
pub struct TemplateJson {
    pub key: String,
    pub label: String,
}

#[derive(Serialize)]
pub struct TaskDetailJson<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub children: Vec<&'a str>,
}

pub fn moved_to_json(
    id: &str,
    position: DropPosition,
    target: Option<&str>,
    outcome: &MoveOutcome,
) -> MovedJson {
    MovedJson {
        id: id.to_string(),
        position: position.to_string(),
        target: target.map(String::from),
        parent_id: outcome.parent_id.clone(),
        level: outcome.level,
        order: outcome.order,
        relevelled: outcome.relevelled,
    }
}

pub fn template_to_json(template: &Template) -> TemplateJson {
    TemplateJson {
        key: template.key.to_string(),
        label: template.label.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `Associate/Week 1, Contractor/Week 2`
pub fn format_profiles(task: &Task) -> String {
    task.profiles
        .iter()
        .map(|p| format!("{}/{}", p.profile_type, p.timeline))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The whole tree, one task per line: indented name, ID, profiles.
/// Names are padded so the ID column lines up.
pub fn format_tree(nodes: &[TaskNode<'_>]) -> Vec<String> {
    let mut rows: Vec<(String, &Task)> = Vec::new();
    for node in nodes {
        collect_rows(node, 0, &mut rows);
    }
    let name_width = rows
        .iter()
        .map(|(name, _)| display_width(name))
        .max()
        .unwrap_or(0);
    let id_width = rows.iter().map(|(_, t)| display_width(&t.id)).max().unwrap_or(0);

    rows.into_iter()
        .map(|(name, task)| {
            let profiles = format_profiles(task);
            let line = format!(
                "{}  {}  {}",
                pad_to_width(&name, name_width),
                pad_to_width(&task.id, id_width),
                profiles
            );
            line.trim_end().to_string()
        })
        .collect()
}

fn collect_rows<'a>(node: &TaskNode<'a>, depth: usize, rows: &mut Vec<(String, &'a Task)>) {
    let name = format!(
        "{}{}",
        "  ".repeat(depth),
        truncate_to_width(&node.task.name, NAME_COLUMN_MAX)
    );
    rows.push((name, node.task));
    for child in &node.children {
        collect_rows(child, depth + 1, rows);
    }
}

/// Detailed view of one task
pub fn format_task_detail(task: &Task, data: &ProjectData) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("{} {}", task.id, task.name));
    lines.push(format!("level: {}", task.level));
    lines.push(format!("order: {}", task.order));

    if let Some(pid) = &task.parent_id {
        match data.find(pid) {
            Some(parent) => lines.push(format!("parent: {} {}", parent.id, parent.name)),
            None => lines.push(format!("parent: {} (missing)", pid)),
        }
    }

    if !task.description.is_empty() {
        lines.push("description:".to_string());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }

    if task.profiles.is_empty() {
        lines.push("profiles: none".to_string());
    } else {
        lines.push("profiles:".to_string());
        for (i, p) in task.profiles.iter().enumerate() {
            lines.push(format!("  {}. {} / {}", i + 1, p.profile_type, p.timeline));
        }
    }

    let mut children: Vec<&Task> = data
        .tasks
        .iter()
        .filter(|t| t.parent_id.as_deref() == Some(task.id.as_str()))
        .collect();
    children.sort_by(|a, b| a.order.total_cmp(&b.order));
    if !children.is_empty() {
        lines.push(String::new());
        lines.push("subtasks:".to_string());
        for child in children {
            lines.push(format!("  {} {}", child.id, child.name));
        }
    }

    lines
}

/// A profile's checklist grouped by timeline
pub fn format_profile_checklist(checklist: &ProfileChecklist) -> Vec<String> {
    let mut lines = Vec::new();
    if checklist.is_empty() {
        lines.push(format!("no tasks assigned to {}", checklist.profile));
        return lines;
    }
    lines.push(format!(
        "== {} ({} tasks) ==",
        checklist.profile,
        checklist.task_count()
    ));
    for group in &checklist.groups {
        lines.push(String::new());
        lines.push(format!("-- {} --", group.timeline));
        let tree = group.hierarchy();
        for node in &tree {
            push_checklist_item(node, 0, &mut lines);
        }
    }
    lines
}

fn push_checklist_item(node: &TaskNode<'_>, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{}[ ] {}", indent, node.task.name);
    if !node.task.description.is_empty() {
        line.push_str(&format!(" - {}", first_line(&node.task.description)));
    }
    lines.push(line);
    for child in &node.children {
        push_checklist_item(child, depth + 1, lines);
    }
}

pub fn format_check_error(error: &CheckError) -> String {
    match error {
        CheckError::DuplicateId { task_id, count } => {
            format!("duplicate id {} ({} records)", task_id, count)
        }
        CheckError::SelfParent { task_id } => format!("{} is its own parent", task_id),
        CheckError::Cycle { task_id } => format!("{} is part of a parent cycle", task_id),
        CheckError::LevelOutOfRange { task_id, level } => {
            format!("{} has level {} (allowed 1-3)", task_id, level)
        }
        CheckError::LevelMismatch {
            task_id,
            level,
            expected,
        } => format!("{} has level {}, expected {}", task_id, level, expected),
        CheckError::DuplicateOrder {
            parent_id,
            order,
            task_ids,
        } => format!(
            "siblings under {} share order {}: {}",
            parent_id.as_deref().unwrap_or("root"),
            order,
            task_ids.join(", ")
        ),
    }
}

pub fn format_check_warning(warning: &CheckWarning) -> String {
    match warning {
        CheckWarning::DanglingParent { task_id, parent_id } => {
            format!("{} has missing parent {} (shown as root)", task_id, parent_id)
        }
        CheckWarning::NoProfiles { task_id } => format!("{} has no profiles", task_id),
        CheckWarning::EmptyName { task_id } => format!("{} has an empty name", task_id),
        CheckWarning::UnknownProfile {
            task_id,
            profile_type,
        } => format!("{} uses unconfigured profile {}", task_id, profile_type),
        CheckWarning::UnknownTimeline { task_id, timeline } => {
            format!("{} uses unconfigured timeline {}", task_id, timeline)
        }
    }
}

pub fn format_check_result(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    for e in &result.errors {
        lines.push(format!("error: {}", format_check_error(e)));
    }
    for w in &result.warnings {
        lines.push(format!("warning: {}", format_check_warning(w)));
    }
    if result.valid {
        lines.push(format!("ok ({} warnings)", result.warnings.len()));
    } else {
        lines.push(format!(
            "{} errors, {} warnings",
            result.errors.len(),
            result.warnings.len()
        ));
    }
    lines
}

/// Key and label per line, used by `ct templates`
pub fn format_templates(templates: &[Template]) -> Vec<String> {
    let width = templates.iter().map(|t| display_width(t.key)).max().unwrap_or(0);
    templates
        .iter()
        .map(|t| format!("{}  {}", pad_to_width(t.key, width), t.label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::default_timelines;
    use crate::model::task::ProfileAssignment;
    use crate::ops::hierarchy::{build_hierarchy, tasks_for_profile};
    use pretty_assertions::assert_eq;

    fn data() -> ProjectData {
        let mut a = Task::new("a", "Equipment", 1.0);
        a.profiles.push(ProfileAssignment::new("Intern", "Week 1"));
        let mut a1 = Task::new("a1", "Laptop", 1.1).with_parent("a", 2);
        a1.description = "From IT\nBring ID".to_string();
        a1.profiles.push(ProfileAssignment::new("Intern", "Week 1"));
        a1.profiles.push(ProfileAssignment::new("Manager", "Month 1"));
        let b = Task::new("b", "Review", 2.0);
        ProjectData::new(vec![b, a1, a])
    }

    #[test]
    fn test_format_tree_aligns_columns() {
        let data = data();
        let tree = build_hierarchy(&data.tasks);
        assert_eq!(
            format_tree(&tree),
            vec![
                "Equipment  a   Intern/Week 1",
                "  Laptop   a1  Intern/Week 1, Manager/Month 1",
                "Review     b",
            ]
        );
    }

    #[test]
    fn test_format_task_detail() {
        let data = data();
        let lines = format_task_detail(data.find("a1").unwrap(), &data);
        assert_eq!(
            lines,
            vec![
                "a1 Laptop",
                "level: 2",
                "order: 1.1",
                "parent: a Equipment",
                "description:",
                "  From IT",
                "  Bring ID",
                "profiles:",
                "  1. Intern / Week 1",
                "  2. Manager / Month 1",
            ]
        );
    }

    #[test]
    fn test_format_profile_checklist() {
        let data = data();
        let checklist = tasks_for_profile(&data.tasks, "Intern", &default_timelines());
        assert_eq!(
            format_profile_checklist(&checklist),
            vec![
                "== Intern (2 tasks) ==",
                "",
                "-- Week 1 --",
                "[ ] Equipment",
                "  [ ] Laptop - From IT\u{2026}",
            ]
        );
        let none = tasks_for_profile(&data.tasks, "CDP", &default_timelines());
        assert_eq!(format_profile_checklist(&none), vec!["no tasks assigned to CDP"]);
    }

    #[test]
    fn test_format_check_result_ok() {
        let result = CheckResult {
            valid: true,
            errors: vec![],
            warnings: vec![CheckWarning::NoProfiles { task_id: "b".into() }],
        };
        assert_eq!(
            format_check_result(&result),
            vec!["warning: b has no profiles", "ok (1 warnings)"]
        );
    }
}
