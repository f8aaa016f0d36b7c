use std::fs;
use std::path::{Path, PathBuf};

use crate::io::project_io::ProjectError;
use crate::io::recovery::atomic_write;
use crate::model::config::ProjectConfig;

pub const CONFIG_FILE: &str = "config.toml";

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Read `checktree/config.toml`. A missing file yields the defaults; a file
/// that exists but doesn't parse is an error.
pub fn read_config(data_dir: &Path) -> Result<ProjectConfig, ProjectError> {
    let path = config_path(data_dir);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(ProjectConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ProjectError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: ProjectConfig = toml::from_str(&text)?;
    Ok(config)
}

/// Write the config with every section spelled out
pub fn write_config(data_dir: &Path, config: &ProjectConfig) -> Result<(), ProjectError> {
    let path = config_path(data_dir);
    let text = toml::to_string_pretty(config)?;
    atomic_write(&path, text.as_bytes()).map_err(|e| ProjectError::WriteError { path, source: e })?;
    Ok(())
}
