//! goinspect - Go workspace static analysis.
//!
//! Given any path inside a Go module, goinspect builds a structured model of
//! the module: packages, functions, structs, interfaces and their imports,
//! plus go.mod requirements, git state, toolchain details and optional test
//! coverage. On top of the model it computes metrics, flags issues (such as
//! overly complex functions) and proposes improvements.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter based per-file fact extraction
//! - `workspace`: module discovery, the package model and every phase
//! - `report`: Output formatting (pretty, JSON, YAML)
//! - `cli`: the `goinspect` command
//!
//! # Example
//!
//! ```no_run
//! use goinspect::workspace::{detect_workspace, AnalysisOptions};
//!
//! # async fn run() -> Result<(), goinspect::WorkspaceError> {
//! let result = detect_workspace(".", &AnalysisOptions::default()).await?;
//! println!("{} is a {}", result.workspace.module_path, result.workspace.project_type);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod error;
pub mod report;
pub mod workspace;

pub use analysis::{register_analyzers, Declaration, DeclarationKind, FileFacts, GoAnalyzer, LanguageAnalyzer};
pub use error::WorkspaceError;
pub use workspace::{detect_workspace, AnalysisOptions, AnalysisResult, WorkspaceDetector, WorkspaceInfo};
