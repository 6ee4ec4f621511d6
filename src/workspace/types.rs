//! Data model produced by a workspace analysis.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse classification of what a module builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Cli,
    WebService,
    Microservice,
    Library,
    Monorepo,
    #[default]
    Unknown,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Cli => "cli",
            ProjectType::WebService => "web_service",
            ProjectType::Microservice => "microservice",
            ProjectType::Library => "library",
            ProjectType::Monorepo => "monorepo",
            ProjectType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything learned about one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    /// Directory containing go.mod.
    pub root: PathBuf,
    /// Module path from the `module` directive (may be empty).
    pub module_path: String,
    pub project_type: ProjectType,
    /// Language version from the `go` directive (may be empty).
    pub go_version: String,
    /// Toolchain from the `toolchain` directive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<String>,
    /// Packages ordered by directory, unique by path.
    pub packages: Vec<PackageInfo>,
    pub dependencies: Vec<DependencyInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<Replacement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_coverage: Option<TestCoverageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_info: Option<BuildInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_info: Option<GitInfo>,
    /// Source files skipped because they did not parse.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_failures: Vec<ParseFailure>,
    pub analyzed_at: DateTime<Utc>,
}

impl WorkspaceInfo {
    /// An empty workspace stamped with the current time.
    pub fn new(root: impl Into<PathBuf>, module_path: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            module_path: module_path.into(),
            project_type: ProjectType::Unknown,
            go_version: String::new(),
            toolchain: None,
            packages: Vec::new(),
            dependencies: Vec::new(),
            replacements: Vec::new(),
            test_coverage: None,
            build_info: None,
            git_info: None,
            parse_failures: Vec::new(),
            analyzed_at: Utc::now(),
        }
    }

    /// Find a package by its directory.
    pub fn package(&self, path: &std::path::Path) -> Option<&PackageInfo> {
        self.packages.iter().find(|p| p.path == path)
    }

    /// Find a package by its import path.
    pub fn package_by_import_path(&self, import_path: &str) -> Option<&PackageInfo> {
        self.packages.iter().find(|p| p.import_path == import_path)
    }

    /// Iterate over every function in every package.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionInfo> {
        self.packages.iter().flat_map(|p| p.functions.iter())
    }
}

/// One directory of Go source files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name from the package clause.
    pub name: String,
    /// Absolute directory path; unique within a workspace.
    pub path: PathBuf,
    pub import_path: String,
    /// Whether this is a `main` package.
    pub is_entry_point: bool,
    pub line_count: usize,
    pub file_count: usize,
    /// Test files, relative to the workspace root.
    pub test_files: Vec<String>,
    pub functions: Vec<FunctionInfo>,
    pub structs: Vec<StructInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    /// Every import seen in the package, sorted and unique.
    pub imports: Vec<String>,
    /// Imports that are neither standard library nor part of this module.
    pub external_imports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub package: String,
    /// Receiver type for methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// File relative to the workspace root.
    pub file: String,
    pub exported: bool,
    pub start_line: usize,
    pub end_line: usize,
    pub params: Vec<String>,
    pub results: Vec<String>,
    pub is_test: bool,
    pub is_benchmark: bool,
    /// Cyclomatic complexity, always >= 1.
    pub complexity: u32,
}

impl FunctionInfo {
    /// `Receiver.Name` for methods, `Name` otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}.{}", recv, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub type_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub embedded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructInfo {
    pub name: String,
    pub package: String,
    pub file: String,
    pub line: usize,
    pub exported: bool,
    pub fields: Vec<FieldInfo>,
    /// Names of methods declared with this struct as receiver.
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    /// Rendered as `(params) results`.
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub package: String,
    pub file: String,
    pub line: usize,
    pub exported: bool,
    pub methods: Vec<MethodInfo>,
    /// Embedded interfaces and type-set elements.
    pub embedded: Vec<String>,
}

/// A `require` entry of go.mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub path: String,
    pub version: String,
    /// Marked `// indirect` in go.mod. A dependency is direct otherwise.
    pub indirect: bool,
    /// Import paths of packages that import this module.
    #[serde(default)]
    pub importers: Vec<String>,
    /// Bytes on disk in the module cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DependencyInfo {
    pub fn new(path: impl Into<String>, version: impl Into<String>, indirect: bool) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            indirect,
            importers: Vec::new(),
            size: None,
            license: None,
            last_updated: None,
        }
    }

    pub fn is_direct(&self) -> bool {
        !self.indirect
    }

    /// Whether `import_path` is this module or one of its packages.
    pub fn provides(&self, import_path: &str) -> bool {
        path_within(import_path, &self.path)
    }
}

/// A `replace` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// `import_path` equals `module` or lives below it.
pub fn path_within(import_path: &str, module: &str) -> bool {
    !module.is_empty()
        && (import_path == module
            || import_path
                .strip_prefix(module)
                .map(|rest| rest.starts_with('/'))
                .unwrap_or(false))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCoverageInfo {
    /// Number of profile blocks.
    pub total_lines: usize,
    /// Blocks executed at least once.
    pub covered_lines: usize,
    /// 0 when `total_lines` is 0.
    pub percentage: f64,
    /// Percentage per package import path.
    pub package_coverage: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    pub is_repo: bool,
    pub branch: String,
    pub commit_hash: String,
    pub commit_message: String,
    pub commit_author: String,
    pub is_dirty: bool,
    pub remote_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// e.g. "1.22.1".
    pub go_version: String,
    /// e.g. "linux/amd64".
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goroot: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub file: String,
    pub message: String,
}

/// Severity levels for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Area an issue or suggestion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Complexity,
    Testing,
    Dependencies,
    Documentation,
    Maintenance,
    Automation,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Complexity => "complexity",
            Category::Testing => "testing",
            Category::Dependencies => "dependencies",
            Category::Documentation => "documentation",
            Category::Maintenance => "maintenance",
            Category::Automation => "automation",
        }
    }

    /// Human-readable name for reports.
    pub fn display_name(&self) -> &'static str {
        CATEGORY_NAMES.get(self.as_str()).copied().unwrap_or("Other")
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static CATEGORY_NAMES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "complexity" => "Code Complexity",
    "testing" => "Testing",
    "dependencies" => "Dependencies",
    "documentation" => "Documentation",
    "maintenance" => "Maintenance",
    "automation" => "CI/CD Automation",
};

/// Rule identifiers for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueRule {
    #[serde(rename = "high-complexity")]
    HighComplexity,
    #[serde(rename = "missing-tests")]
    MissingTests,
    #[serde(rename = "unused-dependency")]
    UnusedDependency,
    #[serde(rename = "undeclared-import")]
    UndeclaredImport,
}

impl IssueRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueRule::HighComplexity => "high-complexity",
            IssueRule::MissingTests => "missing-tests",
            IssueRule::UnusedDependency => "unused-dependency",
            IssueRule::UndeclaredImport => "undeclared-import",
        }
    }
}

impl std::fmt::Display for IssueRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A problem found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub category: Category,
    pub severity: Severity,
    /// File relative to the workspace root (empty for module-level issues).
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub rule: IssueRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// An improvement that is not tied to a defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: Category,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Aggregate numbers over the whole workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_packages: usize,
    pub total_files: usize,
    pub total_lines: usize,
    pub total_functions: usize,
    pub total_structs: usize,
    pub total_interfaces: usize,
    pub exported_functions: usize,
    pub test_files: usize,
    pub test_functions: usize,
    pub average_complexity: f64,
    pub max_complexity: u32,
    /// 0 when coverage was not collected.
    pub coverage_percentage: f64,
}

/// Outcome of an optional phase.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum PhaseStatus {
    /// Switched off in the options.
    #[default]
    Disabled,
    Completed,
    /// Ran and failed; the result field is empty.
    Failed(String),
}

impl PhaseStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, PhaseStatus::Failed(_))
    }
}

/// Status of every optional phase of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub dependencies: PhaseStatus,
    pub git: PhaseStatus,
    pub coverage: PhaseStatus,
    pub build: PhaseStatus,
}

impl PhaseReport {
    /// Phases in execution order with their names.
    pub fn entries(&self) -> [(&'static str, &PhaseStatus); 4] {
        [
            ("dependencies", &self.dependencies),
            ("git", &self.git),
            ("coverage", &self.coverage),
            ("build", &self.build),
        ]
    }
}

/// Terminal aggregate of one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub workspace: WorkspaceInfo,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    pub metrics: Metrics,
    pub phases: PhaseReport,
}
