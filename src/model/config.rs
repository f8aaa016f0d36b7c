use serde::{Deserialize, Serialize};

/// Configuration from checktree/config.toml. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectInfo,
    #[serde(default)]
    pub profiles: ProfileConfig,
    #[serde(default)]
    pub timelines: TimelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Known profile types. The first one is the default for new assignments.
    #[serde(default = "default_profile_types")]
    pub types: Vec<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            types: default_profile_types(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Timeline buckets in display order. Exports rank timelines by their
    /// position here; unknown timelines sort first.
    #[serde(default = "default_timelines")]
    pub options: Vec<String>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        TimelineConfig {
            options: default_timelines(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base filter directive, raised by `-v` on the command line
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

pub fn default_profile_types() -> Vec<String> {
    ["Contractor", "Associate", "CDP", "Intern", "Manager"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn default_timelines() -> Vec<String> {
    [
        "Week 1", "Week 2", "Week 3", "Week 4", "Month 1", "Month 2", "Month 3", "Month 6",
        "Month 12",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl ProjectConfig {
    pub fn default_profile_type(&self) -> Option<&str> {
        self.profiles.types.first().map(|s| s.as_str())
    }

    pub fn default_timeline(&self) -> Option<&str> {
        self.timelines.options.first().map(|s| s.as_str())
    }

    pub fn is_known_profile(&self, profile_type: &str) -> bool {
        self.profiles.types.iter().any(|p| p == profile_type)
    }

    pub fn is_known_timeline(&self, timeline: &str) -> bool {
        self.timelines.options.iter().any(|t| t == timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert_eq!(config.profiles.types.len(), 5);
        assert_eq!(config.default_profile_type(), Some("Contractor"));
        assert_eq!(config.default_timeline(), Some("Week 1"));
        assert_eq!(config.timelines.options.last().unwrap(), "Month 12");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_config_overrides_section() {
        let config: ProjectConfig = toml::from_str(
            r#"[project]
name = "Onboarding"

[timelines]
options = ["Day 1", "Day 2"]
"#,
        )
        .unwrap();
        assert_eq!(config.project.name, "Onboarding");
        assert!(config.is_known_timeline("Day 2"));
        assert!(!config.is_known_timeline("Week 1"));
        assert!(config.is_known_profile("Manager"));
    }
}
