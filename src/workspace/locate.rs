//! Module root discovery.

use std::path::{Path, PathBuf};

use crate::error::WorkspaceError;

/// Name of the module manifest.
pub const MANIFEST_FILE: &str = "go.mod";

/// Walk upward from `start` to the first directory containing go.mod.
///
/// A file path starts the search at its parent directory.
pub fn find_module_root(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let abs = start
        .canonicalize()
        .map_err(|source| WorkspaceError::InvalidPath {
            path: start.to_path_buf(),
            source,
        })?;

    let first = if abs.is_file() {
        abs.parent().map(Path::to_path_buf).unwrap_or(abs.clone())
    } else {
        abs.clone()
    };

    for dir in first.ancestors() {
        if dir.join(MANIFEST_FILE).is_file() {
            return Ok(dir.to_path_buf());
        }
    }

    Err(WorkspaceError::ModuleNotFound { start: abs })
}
