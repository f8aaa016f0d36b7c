use checktree::export::{export_csv, export_json};
use checktree::model::config::ProjectConfig;
use checktree::model::project::ProjectData;
use checktree::ops::check::check_data;
use checktree::ops::hierarchy::{build_hierarchy, flatten};
use checktree::ops::import::parse_import;
use checktree::ops::task_ops::{DropPosition, NewTask, add_task, move_task};
use checktree::templates::TEMPLATES;
use pretty_assertions::assert_eq;

/// Helper: export a store as JSON, import it again, and assert the result is
/// the same store with the same tree.
fn assert_json_round_trip(data: &ProjectData, label: &str) {
    let exported = export_json(data).unwrap();
    let imported = parse_import(&exported)
        .unwrap_or_else(|e| panic!("Round-trip import failed for {}: {}", label, e));

    assert_eq!(&imported, data, "Round-trip changed the store for {}", label);

    let ids = |d: &ProjectData| -> Vec<String> {
        flatten(&build_hierarchy(&d.tasks))
            .into_iter()
            .map(|t| t.id.clone())
            .collect()
    };
    assert_eq!(ids(&imported), ids(data), "Tree order changed for {}", label);

    // exporting the imported store again is byte-identical
    assert_eq!(export_json(&imported).unwrap(), exported);
}

// ============================================================================
// Built-in checklists
// ============================================================================

#[test]
fn round_trip_every_template() {
    for template in TEMPLATES {
        let data = template.data().unwrap();
        assert!(!data.is_empty(), "{} is empty", template.key);
        assert_json_round_trip(&data, template.key);
    }
}

#[test]
fn templates_pass_check() {
    let config = ProjectConfig::default();
    for template in TEMPLATES {
        let result = check_data(&template.data().unwrap(), &config);
        assert!(result.errors.is_empty(), "{}: {:?}", template.key, result.errors);
    }
}

// ============================================================================
// Stores built by mutation
// ============================================================================

#[test]
fn round_trip_after_edits() {
    let mut data = TEMPLATES
        .iter()
        .find(|t| t.key == "advanced-project")
        .unwrap()
        .data()
        .unwrap();

    let first_root = build_hierarchy(&data.tasks)[0].task.id.clone();
    let added = add_task(&mut data, NewTask::child("Extra step", first_root.clone())).unwrap();
    let nested = add_task(&mut data, NewTask::child("Extra detail", added.clone())).unwrap();
    move_task(&mut data, &nested, None, DropPosition::Root).unwrap();
    move_task(&mut data, &added, Some(first_root.as_str()), DropPosition::Before).unwrap();

    assert!(check_data(&data, &ProjectConfig::default()).valid);
    assert_json_round_trip(&data, "edited advanced-project");
}

#[test]
fn round_trip_keeps_unknown_profiles_and_dangling_parents() {
    let source = r#"{
  "tasks": [
    {
      "id": "orphan",
      "order": 7.25,
      "name": "Orphan",
      "description": "Parent was deleted elsewhere",
      "profiles": [
        {
          "profileType": "Astronaut",
          "timeline": "Year 3"
        }
      ],
      "parentId": "gone",
      "level": 2
    }
  ]
}"#;
    let data = parse_import(source).unwrap();
    assert_eq!(export_json(&data).unwrap(), source);
    assert_json_round_trip(&data, "dangling parent");
}

#[test]
fn csv_has_one_row_per_profile() {
    for template in TEMPLATES {
        let data = template.data().unwrap();
        let csv = export_csv(&data);
        let rows = csv.split("\r\n").count() - 1;
        let expected: usize = data.tasks.iter().map(|t| t.profiles.len().max(1)).sum();
        assert_eq!(rows, expected, "{}", template.key);
    }
}
