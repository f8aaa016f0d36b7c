use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::config::ProjectConfig;
use crate::model::project::ProjectData;
use crate::model::task::MAX_LEVEL;
use crate::ops::hierarchy::ChildIndex;

/// Structured result from `ct check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A broken store invariant. Mutations never produce these; imported
/// documents can.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// Two or more records share an ID
    #[serde(rename = "duplicate_id")]
    DuplicateId { task_id: String, count: usize },
    /// A record names itself as parent
    #[serde(rename = "self_parent")]
    SelfParent { task_id: String },
    /// Following parent links from this record loops back to it
    #[serde(rename = "parent_cycle")]
    Cycle { task_id: String },
    /// Level is outside 1..=3
    #[serde(rename = "level_out_of_range")]
    LevelOutOfRange { task_id: String, level: u8 },
    /// Level doesn't match the parent's level + 1 (or 1 for a root)
    #[serde(rename = "level_mismatch")]
    LevelMismatch { task_id: String, level: u8, expected: u8 },
    /// Two siblings share an order key, so their relative order is undefined
    #[serde(rename = "duplicate_order")]
    DuplicateOrder {
        parent_id: Option<String>,
        order: f64,
        task_ids: Vec<String>,
    },
}

/// A non-critical issue. The store still loads and displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Parent ID doesn't exist; the record is shown as a root
    #[serde(rename = "dangling_parent")]
    DanglingParent { task_id: String, parent_id: String },
    /// Task has no profile assignments and appears in no profile checklist
    #[serde(rename = "no_profiles")]
    NoProfiles { task_id: String },
    #[serde(rename = "empty_name")]
    EmptyName { task_id: String },
    /// Profile type not in the configured list
    #[serde(rename = "unknown_profile")]
    UnknownProfile { task_id: String, profile_type: String },
    /// Timeline not in the configured list
    #[serde(rename = "unknown_timeline")]
    UnknownTimeline { task_id: String, timeline: String },
}

/// Validate a store against the hierarchy and ordering invariants.
///
/// Read-only. Errors are invariant violations; warnings are things the
/// display tolerates (dangling parents become roots, unknown timelines sort
/// first).
pub fn check_data(data: &ProjectData, config: &ProjectConfig) -> CheckResult {
    let mut result = CheckResult::default();
    let tasks = &data.tasks;
    let index = ChildIndex::new(tasks);

    // Duplicate IDs, reported once per ID in first-seen order
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut seen_order: Vec<&str> = Vec::new();
    for task in tasks {
        let count = counts.entry(task.id.as_str()).or_insert(0);
        if *count == 0 {
            seen_order.push(task.id.as_str());
        }
        *count += 1;
    }
    for id in seen_order {
        let count = counts[id];
        if count > 1 {
            result.errors.push(CheckError::DuplicateId {
                task_id: id.to_string(),
                count,
            });
        }
    }

    let cyclic = cycle_members(data);

    for task in tasks {
        if !(1..=MAX_LEVEL).contains(&task.level) {
            result.errors.push(CheckError::LevelOutOfRange {
                task_id: task.id.clone(),
                level: task.level,
            });
        }

        match task.parent_id.as_deref() {
            Some(pid) if pid == task.id => {
                result.errors.push(CheckError::SelfParent {
                    task_id: task.id.clone(),
                });
            }
            Some(pid) => match index.position(pid) {
                None => result.warnings.push(CheckWarning::DanglingParent {
                    task_id: task.id.clone(),
                    parent_id: pid.to_string(),
                }),
                Some(_) if cyclic.contains(task.id.as_str()) => {
                    result.errors.push(CheckError::Cycle {
                        task_id: task.id.clone(),
                    });
                }
                Some(pos) => {
                    let expected = tasks[pos].level.saturating_add(1);
                    if task.level != expected {
                        result.errors.push(CheckError::LevelMismatch {
                            task_id: task.id.clone(),
                            level: task.level,
                            expected,
                        });
                    }
                }
            },
            None => {
                if task.level != 1 {
                    result.errors.push(CheckError::LevelMismatch {
                        task_id: task.id.clone(),
                        level: task.level,
                        expected: 1,
                    });
                }
            }
        }

        if task.name.trim().is_empty() {
            result.warnings.push(CheckWarning::EmptyName {
                task_id: task.id.clone(),
            });
        }
        if task.profiles.is_empty() {
            result.warnings.push(CheckWarning::NoProfiles {
                task_id: task.id.clone(),
            });
        }
        for profile in &task.profiles {
            if !config.is_known_profile(&profile.profile_type) {
                result.warnings.push(CheckWarning::UnknownProfile {
                    task_id: task.id.clone(),
                    profile_type: profile.profile_type.clone(),
                });
            }
            if !config.is_known_timeline(&profile.timeline) {
                result.warnings.push(CheckWarning::UnknownTimeline {
                    task_id: task.id.clone(),
                    timeline: profile.timeline.clone(),
                });
            }
        }
    }

    check_sibling_orders(data, &mut result);

    result.valid = result.errors.is_empty();
    result
}

/// Records that can reach themselves by following parent links
fn cycle_members(data: &ProjectData) -> HashSet<&str> {
    let parents: HashMap<&str, &str> = data
        .tasks
        .iter()
        .filter_map(|t| t.parent_id.as_deref().map(|p| (t.id.as_str(), p)))
        .collect();

    let mut members = HashSet::new();
    for task in &data.tasks {
        let start = task.id.as_str();
        let mut visited = HashSet::new();
        let mut cur = start;
        while let Some(&parent) = parents.get(cur) {
            if parent == start {
                members.insert(start);
                break;
            }
            if !visited.insert(parent) {
                break;
            }
            cur = parent;
        }
    }
    members
}

fn check_sibling_orders(data: &ProjectData, result: &mut CheckResult) {
    // (parent, order bits) -> ids; -0.0 and 0.0 are folded together
    let mut groups: HashMap<(Option<&str>, u64), Vec<&str>> = HashMap::new();
    let mut first_seen = Vec::new();
    for task in &data.tasks {
        let key = (task.parent_id.as_deref(), (task.order + 0.0).to_bits());
        let ids = groups.entry(key).or_default();
        if ids.is_empty() {
            first_seen.push((key, task.order));
        }
        ids.push(task.id.as_str());
    }
    for (key, order) in first_seen {
        let ids = &groups[&key];
        if ids.len() > 1 {
            result.errors.push(CheckError::DuplicateOrder {
                parent_id: key.0.map(String::from),
                order,
                task_ids: ids.iter().map(|s| s.to_string()).collect(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{ProfileAssignment, Task};
    use crate::ops::task_ops::{self, DropPosition, NewTask, Placement};

    fn assigned(mut task: Task) -> Task {
        task.profiles.push(ProfileAssignment::new("Associate", "Week 1"));
        task
    }

    fn clean_data() -> ProjectData {
        ProjectData::new(vec![
            assigned(Task::new("a", "A", 1.0)),
            assigned(Task::new("a1", "A1", 1.1).with_parent("a", 2)),
            assigned(Task::new("a11", "A11", 1.11).with_parent("a1", 3)),
            assigned(Task::new("b", "B", 2.0)),
        ])
    }

    #[test]
    fn test_clean_store_is_valid() {
        let result = check_data(&clean_data(), &ProjectConfig::default());
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_store_built_by_mutations_has_no_errors() {
        let mut data = ProjectData::default();
        let a = task_ops::add_task(&mut data, NewTask::root("A")).unwrap();
        let b = task_ops::add_task(&mut data, NewTask::root("B")).unwrap();
        let a1 = task_ops::add_task(&mut data, NewTask::child("A1", a.clone())).unwrap();
        let mut first = NewTask::child("A0", a.clone());
        first.placement = Placement::FirstChild;
        task_ops::add_task(&mut data, first).unwrap();
        task_ops::add_task(&mut data, NewTask::child("A11", a1.clone())).unwrap();
        task_ops::move_task(&mut data, &b, Some(a1.as_str()), DropPosition::Before).unwrap();
        task_ops::move_task(&mut data, &a1, None, DropPosition::Root).unwrap();
        task_ops::move_task(&mut data, &b, Some(a.as_str()), DropPosition::Before).unwrap();

        let result = check_data(&data, &ProjectConfig::default());
        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }

    #[test]
    fn test_duplicate_id() {
        let mut data = clean_data();
        data.tasks.push(assigned(Task::new("b", "B again", 5.0)));
        let result = check_data(&data, &ProjectConfig::default());
        assert!(!result.valid);
        assert!(result.errors.contains(&CheckError::DuplicateId {
            task_id: "b".into(),
            count: 2
        }));
    }

    #[test]
    fn test_self_parent_and_cycle() {
        let data = ProjectData::new(vec![
            assigned(Task::new("s", "S", 1.0).with_parent("s", 2)),
            assigned(Task::new("x", "X", 2.0).with_parent("y", 2)),
            assigned(Task::new("y", "Y", 3.0).with_parent("x", 2)),
        ]);
        let result = check_data(&data, &ProjectConfig::default());
        assert!(result.errors.contains(&CheckError::SelfParent { task_id: "s".into() }));
        assert!(result.errors.contains(&CheckError::Cycle { task_id: "x".into() }));
        assert!(result.errors.contains(&CheckError::Cycle { task_id: "y".into() }));
    }

    #[test]
    fn test_level_errors() {
        let data = ProjectData::new(vec![
            assigned(Task::new("a", "A", 1.0)),
            assigned(Task::new("b", "B", 1.1).with_parent("a", 3)),
            assigned(Task::new("c", "C", 2.0).with_parent("a", 0)),
            assigned(Task::new("d", "D", 3.0).with_parent("x", 2)),
        ]);
        let mut data = data;
        data.tasks[3].parent_id = None;

        let result = check_data(&data, &ProjectConfig::default());
        assert!(result.errors.contains(&CheckError::LevelMismatch {
            task_id: "b".into(),
            level: 3,
            expected: 2
        }));
        assert!(result.errors.contains(&CheckError::LevelOutOfRange {
            task_id: "c".into(),
            level: 0
        }));
        assert!(result.errors.contains(&CheckError::LevelMismatch {
            task_id: "d".into(),
            level: 2,
            expected: 1
        }));
    }

    #[test]
    fn test_duplicate_sibling_order() {
        let mut data = clean_data();
        data.tasks.push(assigned(Task::new("c", "C", 2.0)));
        // Same key under a different parent is fine
        data.tasks.push(assigned(Task::new("a2", "A2", 2.0).with_parent("a", 2)));
        let result = check_data(&data, &ProjectConfig::default());
        assert_eq!(
            result.errors,
            vec![CheckError::DuplicateOrder {
                parent_id: None,
                order: 2.0,
                task_ids: vec!["b".into(), "c".into()],
            }]
        );
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut data = clean_data();
        data.tasks.push(Task::new("d", " ", 9.0).with_parent("gone", 2));
        data.tasks[0]
            .profiles
            .push(ProfileAssignment::new("Astronaut", "Week -1"));

        let result = check_data(&data, &ProjectConfig::default());
        assert!(result.valid);
        assert!(result.warnings.contains(&CheckWarning::DanglingParent {
            task_id: "d".into(),
            parent_id: "gone".into()
        }));
        assert!(result.warnings.contains(&CheckWarning::EmptyName { task_id: "d".into() }));
        assert!(result.warnings.contains(&CheckWarning::NoProfiles { task_id: "d".into() }));
        assert!(result.warnings.contains(&CheckWarning::UnknownProfile {
            task_id: "a".into(),
            profile_type: "Astronaut".into()
        }));
        assert!(result.warnings.contains(&CheckWarning::UnknownTimeline {
            task_id: "a".into(),
            timeline: "Week -1".into()
        }));
    }

    #[test]
    fn test_json_shape() {
        let mut data = clean_data();
        data.tasks[0].parent_id = Some("a".into());
        let result = check_data(&data, &ProjectConfig::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["type"], "self_parent");
        assert_eq!(json["errors"][0]["task_id"], "a");
    }
}
