use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
/// The temp file is created in the same directory so the rename never
/// crosses filesystems.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unreadable store preservation
// ---------------------------------------------------------------------------

/// Where a copy of an unreadable store is kept, e.g.
/// `checktree/tasks.unreadable-20250601T120000Z.json`
pub fn unreadable_copy_path(data_dir: &Path, at: DateTime<Utc>) -> PathBuf {
    data_dir.join(format!("tasks.unreadable-{}.json", at.format("%Y%m%dT%H%M%SZ")))
}

/// Keep the raw bytes of a store that failed to decode or parse, so that
/// falling back to sample data and saving over it never loses them.
///
/// Returns the path written. Failure is logged and swallowed: the caller is
/// already on a fallback path.
pub fn preserve_unreadable(data_dir: &Path, raw: &[u8]) -> Option<PathBuf> {
    let path = unreadable_copy_path(data_dir, Utc::now());
    match atomic_write(&path, raw) {
        Ok(()) => {
            tracing::warn!(path = %path.display(), "kept a copy of the unreadable task store");
            Some(path)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "could not keep a copy of the unreadable task store");
            None
        }
    }
}
