use crate::model::project::ProjectData;

/// The store as a pretty-printed `{ "tasks": [...] }` document, re-importable
/// with `ops::import::parse_import`.
pub fn export_json(data: &ProjectData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{ProfileAssignment, Task};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_json_shape() {
        let mut root = Task::new("a", "A", 1.0);
        root.profiles.push(ProfileAssignment::new("Intern", "Week 1"));
        let data = ProjectData::new(vec![root, Task::new("b", "B", 1.1).with_parent("a", 2)]);

        let expected = r#"{
  "tasks": [
    {
      "id": "a",
      "order": 1,
      "name": "A",
      "description": "",
      "profiles": [
        {
          "profileType": "Intern",
          "timeline": "Week 1"
        }
      ],
      "level": 1
    },
    {
      "id": "b",
      "order": 1.1,
      "name": "B",
      "description": "",
      "profiles": [],
      "parentId": "a",
      "level": 2
    }
  ]
}"#;
        assert_eq!(export_json(&data).unwrap(), expected);
    }

    #[test]
    fn test_export_json_empty() {
        assert_eq!(export_json(&ProjectData::default()).unwrap(), "{\n  \"tasks\": []\n}");
    }
}
