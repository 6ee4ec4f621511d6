//! Workspace detection: the single entry point tying every phase together.

use std::future::Future;
use std::path::Path;

use tracing::{info, warn};

use crate::error::WorkspaceError;

use super::build::inspect_build;
use super::classify::detect_project_type;
use super::coverage::collect_coverage;
use super::dependencies::analyze_dependencies;
use super::issues::detect_issues;
use super::locate::find_module_root;
use super::manifest::GoManifest;
use super::metrics::compute_metrics;
use super::options::AnalysisOptions;
use super::suggestions::generate_suggestions;
use super::types::{AnalysisResult, PhaseReport, PhaseStatus, WorkspaceInfo};
use super::vcs::inspect_git;
use super::walker::build_package_model;

/// Runs a full workspace analysis with fixed options.
pub struct WorkspaceDetector {
    options: AnalysisOptions,
}

impl WorkspaceDetector {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyze the module containing `start`.
    ///
    /// Only a missing or unreadable module is an error. Optional phases that
    /// fail leave their field empty and record the reason in `phases`.
    /// Phases run one after another. Dropping the returned future stops any
    /// running external command.
    pub async fn detect(&self, start: &Path) -> Result<AnalysisResult, WorkspaceError> {
        let options = &self.options;

        let scan_options = options.clone();
        let start = start.to_path_buf();
        let (mut workspace, mut phases) =
            tokio::task::spawn_blocking(move || scan_module(&start, &scan_options))
                .await
                .map_err(|e| WorkspaceError::ScanAborted {
                    reason: e.to_string(),
                })??;

        let root = workspace.root.clone();
        let timeout = options.command_timeout();

        let (git_info, git_status) = run_phase("git", options.include_git_info, || {
            inspect_git(&root, &options.git_binary, timeout)
        })
        .await;
        // An unqueryable repository still reports is_repo: false.
        workspace.git_info = match (git_info, &git_status) {
            (Some(info), _) => Some(info),
            (None, PhaseStatus::Failed(_)) => Some(Default::default()),
            (None, _) => None,
        };
        phases.git = git_status;

        (workspace.test_coverage, phases.coverage) =
            run_phase("coverage", options.include_coverage, || {
                collect_coverage(&root, &options.go_binary, timeout)
            })
            .await;
        (workspace.build_info, phases.build) =
            run_phase("build", options.include_build_info, || {
                inspect_build(&root, &options.go_binary, timeout)
            })
            .await;

        let metrics = compute_metrics(&workspace);
        let issues = detect_issues(&workspace, options, &phases);
        let suggestions = generate_suggestions(&workspace, &options.thresholds);
        info!(
            issues = issues.len(),
            suggestions = suggestions.len(),
            "analysis finished"
        );

        Ok(AnalysisResult {
            workspace,
            issues,
            suggestions,
            metrics,
            phases,
        })
    }
}

/// The filesystem half of an analysis: locate, read go.mod, parse sources,
/// classify and cross-reference dependencies. Blocking.
fn scan_module(
    start: &Path,
    options: &AnalysisOptions,
) -> Result<(WorkspaceInfo, PhaseReport), WorkspaceError> {
    let root = find_module_root(start)?;
    info!(root = %root.display(), "module root");

    let manifest = GoManifest::from_root(&root)?;
    let model = build_package_model(&root, &manifest, options);
    info!(
        packages = model.packages.len(),
        skipped = model.parse_failures.len(),
        "source walk finished"
    );

    let mut workspace = WorkspaceInfo::new(&root, manifest.module_path.clone());
    workspace.project_type = detect_project_type(&root, options);
    workspace.go_version = manifest.go_version.clone();
    workspace.toolchain = manifest.toolchain.clone();
    workspace.replacements = manifest.replacements.clone();
    workspace.packages = model.packages;
    workspace.parse_failures = model.parse_failures;

    let mut phases = PhaseReport::default();
    if options.include_dependencies {
        match analyze_dependencies(&manifest, &workspace.packages) {
            Ok(dependencies) => {
                workspace.dependencies = dependencies;
                phases.dependencies = PhaseStatus::Completed;
            }
            Err(e) => {
                warn!(error = %e, "dependency analysis failed");
                workspace.dependencies = manifest.requirements.clone();
                phases.dependencies = PhaseStatus::Failed(e.to_string());
            }
        }
    }

    Ok((workspace, phases))
}

/// Run an optional phase if enabled, mapping its outcome to a status.
async fn run_phase<T, F, Fut>(name: &str, enabled: bool, phase: F) -> (Option<T>, PhaseStatus)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    if !enabled {
        return (None, PhaseStatus::Disabled);
    }
    match phase().await {
        Ok(value) => (Some(value), PhaseStatus::Completed),
        Err(e) => {
            warn!(phase = name, error = %e, "phase failed");
            (None, PhaseStatus::Failed(format!("{:#}", e)))
        }
    }
}

/// Analyze the module containing `start` with the given options.
pub async fn detect_workspace(
    start: impl AsRef<Path>,
    options: &AnalysisOptions,
) -> Result<AnalysisResult, WorkspaceError> {
    WorkspaceDetector::new(options.clone())
        .detect(start.as_ref())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options() -> AnalysisOptions {
        AnalysisOptions {
            include_git_info: false,
            include_build_info: false,
            ..AnalysisOptions::default()
        }
    }

    #[tokio::test]
    async fn test_minimal_module() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/m\n\ngo 1.22\n").unwrap();
        fs::write(temp.path().join("a.go"), "package a\n\nfunc A() {}\n").unwrap();

        let result = detect_workspace(temp.path(), &options()).await.unwrap();
        let ws = &result.workspace;
        assert_eq!(ws.module_path, "example.com/m");
        assert_eq!(ws.go_version, "1.22");
        assert_eq!(ws.packages.len(), 1);
        assert_eq!(ws.packages[0].file_count, 1);
        assert_eq!(ws.project_type, crate::workspace::ProjectType::Library);
        assert!(ws.git_info.is_none());
        assert!(ws.build_info.is_none());
        assert!(ws.test_coverage.is_none());
        assert_eq!(result.phases.dependencies, PhaseStatus::Completed);
        assert_eq!(result.phases.git, PhaseStatus::Disabled);
        assert_eq!(result.metrics.total_functions, 1);
    }

    #[tokio::test]
    async fn test_no_module() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src");
        fs::create_dir(&nested).unwrap();
        match detect_workspace(&nested, &options()).await {
            Err(WorkspaceError::ModuleNotFound { .. }) => {}
            // a go.mod above the temp dir
            Ok(result) => assert_ne!(result.workspace.root, nested),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_failed_phase_is_recorded() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/m\n").unwrap();
        let options = AnalysisOptions {
            include_build_info: true,
            include_coverage: true,
            go_binary: "goinspect-no-such-go".to_string(),
            ..options()
        };

        let result = detect_workspace(temp.path(), &options).await.unwrap();
        assert!(result.workspace.build_info.is_none());
        assert!(result.workspace.test_coverage.is_none());
        assert!(result.phases.build.is_failed());
        assert!(result.phases.coverage.is_failed());
    }

    #[tokio::test]
    async fn test_disabled_dependencies_leave_list_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("go.mod"),
            "module example.com/m\n\nrequire github.com/google/uuid v1.6.0\n",
        )
        .unwrap();
        let options = AnalysisOptions {
            include_dependencies: false,
            ..options()
        };

        let result = detect_workspace(temp.path(), &options).await.unwrap();
        assert!(result.workspace.dependencies.is_empty());
        assert_eq!(result.phases.dependencies, PhaseStatus::Disabled);
    }
}
