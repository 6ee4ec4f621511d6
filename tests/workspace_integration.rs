//! Integration tests for the full workspace analysis.
//!
//! These tests run `detect_workspace` against the fixtures under testdata/
//! and against modules generated in temporary directories. External-process
//! phases stay off unless a test is specifically about them.

use std::fs;
use std::path::{Path, PathBuf};

use goinspect::workspace::{
    detect_workspace, AnalysisOptions, AnalysisResult, Category, IssueRule, PhaseStatus,
    ProjectType,
};
use goinspect::WorkspaceError;
use tempfile::TempDir;

fn testdata_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

async fn analyze(path: &Path) -> AnalysisResult {
    detect_workspace(path, &AnalysisOptions::offline())
        .await
        .expect("analysis should succeed")
}

#[tokio::test]
async fn test_service_fixture_model() {
    let result = analyze(&testdata_path("service")).await;
    let ws = &result.workspace;

    assert_eq!(ws.module_path, "example.com/orders");
    assert_eq!(ws.go_version, "1.20");
    assert_eq!(ws.project_type, ProjectType::Microservice);

    let import_paths: Vec<_> = ws.packages.iter().map(|p| p.import_path.as_str()).collect();
    assert_eq!(
        import_paths,
        vec![
            "example.com/orders",
            "example.com/orders/internal/api",
            "example.com/orders/internal/store",
        ]
    );

    let main = &ws.packages[0];
    assert_eq!(main.name, "main");
    assert!(main.is_entry_point);

    let store = ws
        .package_by_import_path("example.com/orders/internal/store")
        .unwrap();
    assert_eq!(store.file_count, 2);
    assert_eq!(store.test_files, vec!["internal/store/store_test.go"]);
    assert_eq!(store.external_imports, vec!["github.com/google/uuid"]);

    let store_struct = store.structs.iter().find(|s| s.name == "Store").unwrap();
    assert_eq!(store_struct.methods, vec!["Get", "Put", "Route"]);

    let order = store.structs.iter().find(|s| s.name == "Order").unwrap();
    assert_eq!(order.fields.len(), 5);
    assert_eq!(order.fields[0].tag.as_deref(), Some("`json:\"id\"`"));

    let repo = store.interfaces.iter().find(|i| i.name == "Repository").unwrap();
    let methods: Vec<_> = repo.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["Get", "Put"]);

    let route = store.functions.iter().find(|f| f.name == "Route").unwrap();
    assert_eq!(route.receiver.as_deref(), Some("Store"));
    assert_eq!(route.complexity, 11);

    assert!(store.functions.iter().any(|f| f.name == "TestPutGet" && f.is_test));
    assert!(store
        .functions
        .iter()
        .any(|f| f.name == "BenchmarkRoute" && f.is_benchmark));
}

#[tokio::test]
async fn test_service_fixture_vendor_excluded() {
    let result = analyze(&testdata_path("service")).await;
    assert!(result
        .workspace
        .packages
        .iter()
        .all(|p| !p.import_path.contains("/vendor/")));

    let options = AnalysisOptions {
        exclude_vendor: false,
        ..AnalysisOptions::offline()
    };
    let with_vendor = detect_workspace(testdata_path("service"), &options)
        .await
        .unwrap();
    assert!(with_vendor
        .workspace
        .packages
        .iter()
        .any(|p| p.import_path == "example.com/orders/vendor/github.com/google/uuid"));
}

#[tokio::test]
async fn test_service_fixture_dependencies() {
    let result = analyze(&testdata_path("service")).await;
    let deps = &result.workspace.dependencies;
    assert_eq!(result.phases.dependencies, PhaseStatus::Completed);
    assert_eq!(deps.len(), 3);

    let uuid = deps.iter().find(|d| d.path == "github.com/google/uuid").unwrap();
    assert!(!uuid.indirect);
    assert_eq!(uuid.importers, vec!["example.com/orders/internal/store"]);

    let sys = deps.iter().find(|d| d.path == "golang.org/x/sys").unwrap();
    assert!(sys.indirect);
}

#[tokio::test]
async fn test_service_fixture_issues_and_suggestions() {
    let result = analyze(&testdata_path("service")).await;

    let count = |rule: IssueRule| result.issues.iter().filter(|i| i.rule == rule).count();
    assert_eq!(count(IssueRule::HighComplexity), 1);
    assert_eq!(count(IssueRule::MissingTests), 1);
    assert_eq!(count(IssueRule::UnusedDependency), 1);
    assert_eq!(count(IssueRule::UndeclaredImport), 0);

    let complex = result
        .issues
        .iter()
        .find(|i| i.rule == IssueRule::HighComplexity)
        .unwrap();
    assert_eq!(complex.file, "internal/store/store.go");
    assert!(complex.message.contains("Store.Route"));

    let missing = result
        .issues
        .iter()
        .find(|i| i.rule == IssueRule::MissingTests)
        .unwrap();
    assert_eq!(missing.file, "internal/api");

    // README present; go 1.20 is old; no CI config
    let categories: Vec<_> = result.suggestions.iter().map(|s| s.category).collect();
    assert_eq!(categories, vec![Category::Maintenance, Category::Automation]);
}

#[tokio::test]
async fn test_service_fixture_metrics() {
    let result = analyze(&testdata_path("service")).await;
    let m = &result.metrics;
    assert_eq!(m.total_packages, 3);
    assert_eq!(m.total_files, 4);
    assert_eq!(m.test_files, 1);
    assert_eq!(m.test_functions, 1);
    assert_eq!(m.max_complexity, 11);
    assert_eq!(m.coverage_percentage, 0.0);
    assert!(m.average_complexity >= 1.0);
}

#[tokio::test]
async fn test_nested_module_requirement_reported_unused() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "go.mod",
        "module example.com/m\n\ngo 1.22\n\nrequire (\n\tcloud.google.com/go v0.112.0\n\tcloud.google.com/go/storage v1.38.0\n)\n",
    );
    write(
        temp.path(),
        "m.go",
        "package m\n\nimport \"cloud.google.com/go/storage\"\n\nvar client = storage.NewClient\n",
    );

    let result = analyze(temp.path()).await;
    let unused: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.rule == IssueRule::UnusedDependency)
        .collect();
    assert_eq!(unused.len(), 1);
    assert!(unused[0].message.contains("cloud.google.com/go v0.112.0"));
    assert!(!result
        .issues
        .iter()
        .any(|i| i.rule == IssueRule::UndeclaredImport));
}

#[tokio::test]
async fn test_library_fixture() {
    let result = analyze(&testdata_path("library")).await;
    let ws = &result.workspace;

    assert_eq!(ws.project_type, ProjectType::Library);
    assert_eq!(ws.go_version, "");
    assert_eq!(ws.packages.len(), 1);
    assert!(ws.dependencies.is_empty());

    let categories: Vec<_> = result.suggestions.iter().map(|s| s.category).collect();
    assert_eq!(categories, vec![Category::Documentation, Category::Automation]);
}

#[tokio::test]
async fn test_start_from_nested_file() {
    let file = testdata_path("service").join("internal/store/store.go");
    let result = analyze(&file).await;
    assert_eq!(result.workspace.module_path, "example.com/orders");
    assert_eq!(
        result.workspace.root,
        testdata_path("service").canonicalize().unwrap()
    );
}

#[tokio::test]
async fn test_analysis_is_deterministic() {
    let first = analyze(&testdata_path("service")).await;
    let second = analyze(&testdata_path("service")).await;

    let view = |r: &AnalysisResult| {
        serde_json::json!({
            "packages": r.workspace.packages,
            "dependencies": r.workspace.dependencies,
            "project_type": r.workspace.project_type,
            "issues": r.issues,
            "suggestions": r.suggestions,
            "metrics": r.metrics,
        })
    };
    assert_eq!(view(&first), view(&second));
}

#[tokio::test]
async fn test_minimal_module() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "go.mod", "module example.com/m\n");
    write(temp.path(), "m.go", "package m\n\nfunc F() int { return 1 }\n");

    let result = analyze(temp.path()).await;
    let ws = &result.workspace;
    assert_eq!(ws.module_path, "example.com/m");
    assert_eq!(ws.packages.len(), 1);
    assert_eq!(ws.packages[0].file_count, 1);
    assert_eq!(ws.packages[0].import_path, "example.com/m");
}

#[tokio::test]
async fn test_monorepo() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "go.mod", "module example.com/tools\n\ngo 1.22\n");
    write(temp.path(), "cmd/fmtr/main.go", "package main\n\nfunc main() {}\n");
    write(temp.path(), "cmd/lintr/main.go", "package main\n\nfunc main() {}\n");

    let result = analyze(temp.path()).await;
    assert_eq!(result.workspace.project_type, ProjectType::Monorepo);
    assert!(result.workspace.packages.iter().all(|p| p.is_entry_point));
}

#[tokio::test]
async fn test_unparseable_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "go.mod", "module example.com/m\n");
    write(temp.path(), "good.go", "package m\n\nfunc Good() {}\n");
    write(temp.path(), "bad.go", "package m\n\nfunc Bad( {\n");

    let result = analyze(temp.path()).await;
    let ws = &result.workspace;
    assert_eq!(ws.parse_failures.len(), 1);
    assert_eq!(ws.parse_failures[0].file, "bad.go");
    assert_eq!(ws.packages[0].file_count, 1);
    assert_eq!(result.metrics.total_functions, 1);
}

#[tokio::test]
async fn test_readme_toggles_suggestion() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "go.mod", "module example.com/m\n\ngo 1.22\n");
    write(temp.path(), "m.go", "package m\n");

    let before = analyze(temp.path()).await;
    assert!(before
        .suggestions
        .iter()
        .any(|s| s.category == Category::Documentation));

    write(temp.path(), "README.md", "# m\n");
    let after = analyze(temp.path()).await;
    assert!(!after
        .suggestions
        .iter()
        .any(|s| s.category == Category::Documentation));
}

#[tokio::test]
async fn test_disabled_phases_leave_fields_empty() {
    let result = analyze(&testdata_path("library")).await;
    let ws = &result.workspace;
    assert!(ws.git_info.is_none());
    assert!(ws.build_info.is_none());
    assert!(ws.test_coverage.is_none());
    assert_eq!(result.phases.git, PhaseStatus::Disabled);
    assert_eq!(result.phases.coverage, PhaseStatus::Disabled);
    assert_eq!(result.phases.build, PhaseStatus::Disabled);
}

#[tokio::test]
async fn test_missing_toolchain_fails_phases_only() {
    let options = AnalysisOptions {
        include_coverage: true,
        include_build_info: true,
        go_binary: "goinspect-missing-go".to_string(),
        ..AnalysisOptions::offline()
    };
    let result = detect_workspace(testdata_path("library"), &options)
        .await
        .unwrap();

    assert!(result.workspace.test_coverage.is_none());
    assert!(result.workspace.build_info.is_none());
    assert!(result.phases.coverage.is_failed());
    assert!(result.phases.build.is_failed());
    assert_eq!(result.workspace.packages.len(), 1);
}

#[tokio::test]
async fn test_invalid_path() {
    let err = detect_workspace("/goinspect/does/not/exist", &AnalysisOptions::offline())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::InvalidPath { .. }));
}
