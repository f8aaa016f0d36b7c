//! Checklists shipped with the binary.

use crate::model::project::ProjectData;

/// A built-in checklist, embedded at compile time
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub key: &'static str,
    pub label: &'static str,
    json: &'static str,
}

impl Template {
    pub fn data(&self) -> Result<ProjectData, serde_json::Error> {
        serde_json::from_str(self.json)
    }
}

pub const SAMPLE_KEY: &str = "sample";

pub const TEMPLATES: &[Template] = &[
    Template {
        key: SAMPLE_KEY,
        label: "Sample checklist",
        json: include_str!("sample.json"),
    },
    Template {
        key: "new-hire-onboarding",
        label: "New Hire Onboarding",
        json: include_str!("new-hire-onboarding.json"),
    },
    Template {
        key: "new-project-setup",
        label: "New Project Setup",
        json: include_str!("new-project-setup.json"),
    },
    Template {
        key: "advanced-project",
        label: "Advanced Project (Multi-level)",
        json: include_str!("advanced-project.json"),
    },
];

pub fn find_template(key: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.key == key)
}

/// The sample checklist used when a project has no readable store
pub fn sample() -> ProjectData {
    let Some(template) = find_template(SAMPLE_KEY) else {
        return ProjectData::default();
    };
    template.data().unwrap_or_else(|e| {
        tracing::error!(error = %e, "built-in sample checklist is malformed");
        ProjectData::default()
    })
}
