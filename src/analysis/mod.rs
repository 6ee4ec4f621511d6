//! AST-backed code analysis module.
//!
//! This module turns Go source into "facts" using tree-sitter:
//! - Declarations (functions, methods, structs, interfaces) with type strings
//! - Imports
//! - Control flow counts for cyclomatic complexity
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ GoAnalyzer   │────▶│ FileFacts     │
//! └─────────────────┘     └──────────────┘     │ (Declarations,│
//!                                              │  Imports, etc)│
//!                                              └───────────────┘
//!                                                      │
//!                                                      ▼
//!                                              ┌───────────────┐
//!                                              │ workspace     │
//!                                              │ package model │
//!                                              └───────────────┘
//! ```

mod facts;
mod languages;
mod traits;

pub use facts::{
    count_lines, is_exported, results_suffix, ControlFlowInfo, Declaration, DeclarationKind,
    Field, FileFacts, Import, MethodSpec, Signature, Span,
};
pub use languages::{get_analyzer, register_analyzers, GoAnalyzer};
pub use traits::{LanguageAnalyzer, ParsedFile};
