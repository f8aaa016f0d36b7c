use serde_json::Value;

use crate::model::project::ProjectData;
use crate::model::task::Task;

/// Error type for import operations. Each variant names the shape check that
/// failed.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("import file is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("import document must be a JSON object")]
    NotAnObject,
    #[error("import document has no \"tasks\" field")]
    MissingTasks,
    #[error("\"tasks\" must be an array")]
    TasksNotArray,
    #[error("task at index {index} is invalid: {source}")]
    InvalidTask {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse an exported document back into a store.
///
/// Only the document shape is enforced here. Records with duplicate ids,
/// dangling parents or inconsistent levels are accepted as-is; `ops::check`
/// reports them.
pub fn parse_import(text: &str) -> Result<ProjectData, ImportError> {
    let doc: Value = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;
    let Value::Object(mut fields) = doc else {
        return Err(ImportError::NotAnObject);
    };
    let raw = fields.remove("tasks").ok_or(ImportError::MissingTasks)?;
    let Value::Array(items) = raw else {
        return Err(ImportError::TasksNotArray);
    };

    let mut tasks = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let task: Task =
            serde_json::from_value(item).map_err(|source| ImportError::InvalidTask { index, source })?;
        tasks.push(task);
    }

    tracing::debug!(count = tasks.len(), "parsed import document");
    Ok(ProjectData::new(tasks))
}
