use crate::model::project::ProjectData;
use crate::ops::hierarchy::{ProfileChecklist, flatten};

const ROW_SEPARATOR: &str = "\r\n";

const FLAT_HEADER: [&str; 8] = [
    "id",
    "order",
    "name",
    "description",
    "parentId",
    "level",
    "profileType",
    "timeline",
];

const PROFILE_HEADER: [&str; 4] = ["timeline", "level", "name", "description"];

/// Quote a field if it contains a comma, a double quote or a newline. Inner
/// quotes are doubled.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Header plus rows joined with CRLF. No rows renders as an empty document.
fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.join(","));
    for row in rows {
        let fields: Vec<String> = row.iter().map(|f| escape_csv_field(f)).collect();
        lines.push(fields.join(","));
    }
    lines.join(ROW_SEPARATOR)
}

/// One row per (task, profile) in store order. A task without profiles gets
/// a single row with empty profile columns.
pub fn export_csv(data: &ProjectData) -> String {
    let mut rows = Vec::new();
    for task in &data.tasks {
        let base = [
            task.id.clone(),
            task.order.to_string(),
            task.name.clone(),
            task.description.clone(),
            task.parent_id.clone().unwrap_or_default(),
            task.level.to_string(),
        ];
        if task.profiles.is_empty() {
            let mut row = base.to_vec();
            row.extend([String::new(), String::new()]);
            rows.push(row);
        } else {
            for profile in &task.profiles {
                let mut row = base.to_vec();
                row.extend([profile.profile_type.clone(), profile.timeline.clone()]);
                rows.push(row);
            }
        }
    }
    render_table(&FLAT_HEADER, &rows)
}

/// One row per task in a profile checklist: groups in timeline order, tree
/// order within each group.
pub fn export_profile_csv(checklist: &ProfileChecklist) -> String {
    let mut rows = Vec::new();
    for group in &checklist.groups {
        let tree = group.hierarchy();
        for task in flatten(&tree) {
            rows.push(vec![
                group.timeline.clone(),
                task.level.to_string(),
                task.name.clone(),
                task.description.clone(),
            ]);
        }
    }
    render_table(&PROFILE_HEADER, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::default_timelines;
    use crate::model::task::{ProfileAssignment, Task};
    use crate::ops::hierarchy::tasks_for_profile;
    use pretty_assertions::assert_eq;

    fn with_profile(mut task: Task, profile: &str, timeline: &str) -> Task {
        task.profiles.push(ProfileAssignment::new(profile, timeline));
        task
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_csv_field(""), "");
    }

    #[test]
    fn test_export_csv_rows_per_profile() {
        let mut a = Task::new("a", "Set up, then test", 1.0);
        a.profiles.push(ProfileAssignment::new("Associate", "Week 1"));
        a.profiles.push(ProfileAssignment::new("Intern", "Month 1"));
        let b = Task::new("b", "B", 1.1).with_parent("a", 2);
        let data = ProjectData::new(vec![a, b]);

        let expected = [
            "id,order,name,description,parentId,level,profileType,timeline",
            "a,1,\"Set up, then test\",,,1,Associate,Week 1",
            "a,1,\"Set up, then test\",,,1,Intern,Month 1",
            "b,1.1,B,,a,2,,",
        ]
        .join("\r\n");
        assert_eq!(export_csv(&data), expected);
    }

    #[test]
    fn test_export_csv_empty_store() {
        assert_eq!(export_csv(&ProjectData::default()), "");
    }

    #[test]
    fn test_export_profile_csv() {
        let tasks = vec![
            with_profile(Task::new("a", "A", 1.0), "Intern", "Week 2"),
            with_profile(Task::new("a1", "A1", 1.1).with_parent("a", 2), "Intern", "Week 2"),
            with_profile(Task::new("b", "B", 2.0), "Intern", "Week 1"),
            with_profile(Task::new("c", "C", 3.0), "Intern", "Someday"),
            with_profile(Task::new("d", "D", 4.0), "Manager", "Week 1"),
        ];
        let checklist = tasks_for_profile(&tasks, "Intern", &default_timelines());

        let expected = [
            "timeline,level,name,description",
            "Someday,1,C,",
            "Week 1,1,B,",
            "Week 2,1,A,",
            "Week 2,2,A1,",
        ]
        .join("\r\n");
        assert_eq!(export_profile_csv(&checklist), expected);
    }

    #[test]
    fn test_export_profile_csv_no_rows() {
        let tasks = vec![with_profile(Task::new("a", "A", 1.0), "Intern", "Week 1")];
        let checklist = tasks_for_profile(&tasks, "Manager", &default_timelines());
        assert_eq!(export_profile_csv(&checklist), "");
    }
}
