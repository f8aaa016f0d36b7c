use std::fs;
use std::path::{Path, PathBuf};

use crate::export::export_json;
use crate::io::config_io::read_config;
use crate::io::recovery::{atomic_write, preserve_unreadable};
use crate::model::project::{Project, ProjectData};
use crate::ops::import::parse_import;
use crate::templates;

/// Name of the per-project data directory
pub const DATA_DIR: &str = "checktree";
/// The task store inside [`DATA_DIR`]
pub const TASKS_FILE: &str = "tasks.json";

/// Error type for project I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a checktree project: no checktree/ directory found")]
    NotAProject,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not serialize config.toml: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
    #[error("could not serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

pub fn tasks_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TASKS_FILE)
}

/// Discover the project by walking up from the given directory, looking for
/// a `checktree/` subdirectory.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DATA_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

/// Load config and store for the project rooted at `root`
pub fn load_project(root: &Path) -> Result<Project, ProjectError> {
    let data_dir = root.join(DATA_DIR);
    if !data_dir.is_dir() {
        return Err(ProjectError::NotAProject);
    }
    let config = read_config(&data_dir)?;
    let data = load_data(&data_dir)?;
    tracing::debug!(root = %root.display(), tasks = data.len(), "project loaded");
    Ok(Project {
        root: root.to_path_buf(),
        data_dir,
        config,
        data,
    })
}

/// Read the task store. A missing store, or one that isn't valid UTF-8 JSON
/// in the expected shape, falls back to the built-in sample checklist; the
/// raw bytes of a bad store are kept next to it before anything can
/// overwrite it. A store that exists but can't be read is an error, so no
/// later save replaces it.
pub fn load_data(data_dir: &Path) -> Result<ProjectData, ProjectError> {
    let path = tasks_path(data_dir);
    if !path.exists() {
        tracing::warn!(path = %path.display(), "no task store, starting from the sample checklist");
        return Ok(templates::sample());
    }
    let bytes = fs::read(&path).map_err(|e| ProjectError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "task store is not UTF-8, using the sample checklist");
            preserve_unreadable(data_dir, e.as_bytes());
            return Ok(templates::sample());
        }
    };
    match parse_import(&text) {
        Ok(data) => Ok(data),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "task store is malformed, using the sample checklist");
            preserve_unreadable(data_dir, text.as_bytes());
            Ok(templates::sample())
        }
    }
}

/// Write the task store atomically, pretty-printed with a trailing newline
pub fn save_data(data_dir: &Path, data: &ProjectData) -> Result<(), ProjectError> {
    let path = tasks_path(data_dir);
    let mut content = export_json(data)?;
    content.push('\n');
    atomic_write(&path, content.as_bytes()).map_err(|e| ProjectError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), tasks = data.len(), "task store saved");
    Ok(())
}
