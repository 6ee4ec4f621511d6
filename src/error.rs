//! Fatal errors that abort a workspace analysis.
//!
//! Every other failure degrades a single phase; see `workspace::PhaseStatus`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop `detect_workspace` from producing a result.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("cannot access {path}: {source}")]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no go.mod found at or above {start}")]
    ModuleNotFound { start: PathBuf },
    #[error("reading manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("workspace scan did not complete: {reason}")]
    ScanAborted { reason: String },
}
