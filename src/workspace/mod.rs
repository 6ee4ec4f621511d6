//! Go workspace analysis.
//!
//! `detect_workspace` locates the module root, parses go.mod, walks and parses
//! every source file, classifies the project, then runs the optional phases
//! (dependencies, git, coverage, build) before deriving metrics, issues and
//! suggestions.

pub mod build;
pub mod classify;
pub mod command;
pub mod coverage;
pub mod dependencies;
pub mod detector;
pub mod issues;
pub mod locate;
pub mod manifest;
pub mod metrics;
pub mod options;
pub mod suggestions;
pub mod types;
pub mod vcs;
pub mod walker;

pub use classify::{classify_facts, detect_project_type, ProjectFacts};
pub use detector::{detect_workspace, WorkspaceDetector};
pub use locate::{find_module_root, MANIFEST_FILE};
pub use manifest::GoManifest;
pub use metrics::compute_metrics;
pub use options::{AnalysisOptions, Thresholds, DEFAULT_CONFIG_NAMES};
pub use types::{
    AnalysisResult, BuildInfo, Category, DependencyInfo, FieldInfo, FunctionInfo, GitInfo,
    InterfaceInfo, Issue, IssueRule, Metrics, MethodInfo, PackageInfo, ParseFailure, PhaseReport,
    PhaseStatus, Priority, ProjectType, Replacement, Severity, StructInfo, Suggestion,
    TestCoverageInfo, WorkspaceInfo,
};
