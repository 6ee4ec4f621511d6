//! Issue detection rules.

use super::options::AnalysisOptions;
use super::types::{
    path_within, Category, Issue, IssueRule, PhaseReport, PhaseStatus, Severity, WorkspaceInfo,
};
use super::walker::relative_path;

/// Run every applicable rule over the workspace.
///
/// Dependency rules need importer data and only run when the dependency
/// phase completed. `missing-tests` only runs when test files were parsed.
pub fn detect_issues(
    workspace: &WorkspaceInfo,
    options: &AnalysisOptions,
    phases: &PhaseReport,
) -> Vec<Issue> {
    let mut issues = high_complexity(workspace, options.thresholds.max_complexity);
    if options.include_test_files {
        issues.extend(missing_tests(workspace));
    }
    if phases.dependencies == PhaseStatus::Completed {
        issues.extend(unused_dependencies(workspace));
        issues.extend(undeclared_imports(workspace));
    }
    issues
}

fn high_complexity(workspace: &WorkspaceInfo, threshold: u32) -> Vec<Issue> {
    workspace
        .functions()
        .filter(|f| f.complexity > threshold)
        .map(|f| Issue {
            category: Category::Complexity,
            severity: Severity::Warning,
            file: f.file.clone(),
            line: f.start_line,
            column: 1,
            message: format!(
                "function {} has cyclomatic complexity {} (threshold {})",
                f.qualified_name(),
                f.complexity,
                threshold
            ),
            rule: IssueRule::HighComplexity,
            suggestion: Some(format!(
                "Split {} into smaller functions or replace branching with table-driven logic",
                f.name
            )),
        })
        .collect()
}

fn missing_tests(workspace: &WorkspaceInfo) -> Vec<Issue> {
    workspace
        .packages
        .iter()
        .filter(|p| !p.is_entry_point && p.test_files.is_empty())
        .map(|p| Issue {
            category: Category::Testing,
            severity: Severity::Info,
            file: relative_path(&workspace.root, &p.path),
            line: 0,
            column: 0,
            message: format!("package {} has no test files", p.import_path),
            rule: IssueRule::MissingTests,
            suggestion: Some(format!("Add a {}_test.go file next to the package sources", p.name)),
        })
        .collect()
}

fn unused_dependencies(workspace: &WorkspaceInfo) -> Vec<Issue> {
    workspace
        .dependencies
        .iter()
        .filter(|d| d.is_direct() && d.importers.is_empty())
        .map(|d| Issue {
            category: Category::Dependencies,
            severity: Severity::Info,
            file: "go.mod".to_string(),
            line: 0,
            column: 0,
            message: format!("direct dependency {} {} is not imported", d.path, d.version),
            rule: IssueRule::UnusedDependency,
            suggestion: Some("Run `go mod tidy` to drop unused requirements".to_string()),
        })
        .collect()
}

fn undeclared_imports(workspace: &WorkspaceInfo) -> Vec<Issue> {
    let declared = |import: &str| {
        workspace.dependencies.iter().any(|d| d.provides(import))
            || workspace
                .replacements
                .iter()
                .any(|r| path_within(import, &r.from))
    };

    let mut issues = Vec::new();
    for package in &workspace.packages {
        for import in package.external_imports.iter().filter(|i| !declared(i.as_str())) {
            issues.push(Issue {
                category: Category::Dependencies,
                severity: Severity::Warning,
                file: relative_path(&workspace.root, &package.path),
                line: 0,
                column: 0,
                message: format!(
                    "package {} imports {} which no go.mod requirement provides",
                    package.import_path, import
                ),
                rule: IssueRule::UndeclaredImport,
                suggestion: Some(format!("Run `go get {}`", import)),
            });
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::types::{DependencyInfo, FunctionInfo, PackageInfo};
    use std::path::PathBuf;

    fn function(name: &str, complexity: u32) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            package: "store".to_string(),
            receiver: Some("Store".to_string()),
            file: "store/store.go".to_string(),
            exported: true,
            start_line: 12,
            end_line: 40,
            params: Vec::new(),
            results: Vec::new(),
            is_test: false,
            is_benchmark: false,
            complexity,
        }
    }

    fn workspace() -> WorkspaceInfo {
        let mut workspace = WorkspaceInfo::new("/m", "example.com/m");
        workspace.packages = vec![
            PackageInfo {
                name: "main".to_string(),
                path: PathBuf::from("/m"),
                import_path: "example.com/m".to_string(),
                is_entry_point: true,
                ..PackageInfo::default()
            },
            PackageInfo {
                name: "store".to_string(),
                path: PathBuf::from("/m/store"),
                import_path: "example.com/m/store".to_string(),
                functions: vec![function("Get", 12), function("Put", 10)],
                external_imports: vec![
                    "github.com/google/uuid".to_string(),
                    "github.com/lib/pq".to_string(),
                ],
                ..PackageInfo::default()
            },
        ];
        let mut uuid = DependencyInfo::new("github.com/google/uuid", "v1.6.0", false);
        uuid.importers = vec!["example.com/m/store".to_string()];
        workspace.dependencies = vec![
            uuid,
            DependencyInfo::new("github.com/spf13/cobra", "v1.8.0", false),
            DependencyInfo::new("golang.org/x/sys", "v0.20.0", true),
        ];
        workspace
    }

    fn completed() -> PhaseReport {
        PhaseReport {
            dependencies: PhaseStatus::Completed,
            ..PhaseReport::default()
        }
    }

    fn rules(issues: &[Issue]) -> Vec<IssueRule> {
        issues.iter().map(|i| i.rule).collect()
    }

    #[test]
    fn test_high_complexity_strictly_above_threshold() {
        let issues = detect_issues(&workspace(), &AnalysisOptions::default(), &PhaseReport::default());
        let complexity: Vec<_> = issues
            .iter()
            .filter(|i| i.rule == IssueRule::HighComplexity)
            .collect();
        assert_eq!(complexity.len(), 1);
        assert_eq!(complexity[0].file, "store/store.go");
        assert_eq!(complexity[0].line, 12);
        assert_eq!(complexity[0].severity, Severity::Warning);
        assert!(complexity[0].message.contains("Store.Get"));
    }

    #[test]
    fn test_missing_tests_skips_entry_points() {
        let issues = detect_issues(&workspace(), &AnalysisOptions::default(), &PhaseReport::default());
        let missing: Vec<_> = issues
            .iter()
            .filter(|i| i.rule == IssueRule::MissingTests)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].file, "store");
    }

    #[test]
    fn test_missing_tests_needs_test_files() {
        let options = AnalysisOptions {
            include_test_files: false,
            ..AnalysisOptions::default()
        };
        let issues = detect_issues(&workspace(), &options, &PhaseReport::default());
        assert!(!rules(&issues).contains(&IssueRule::MissingTests));
    }

    #[test]
    fn test_dependency_rules_need_completed_phase() {
        let issues = detect_issues(&workspace(), &AnalysisOptions::default(), &PhaseReport::default());
        assert!(!rules(&issues).contains(&IssueRule::UnusedDependency));
        assert!(!rules(&issues).contains(&IssueRule::UndeclaredImport));

        let failed = PhaseReport {
            dependencies: PhaseStatus::Failed("boom".to_string()),
            ..PhaseReport::default()
        };
        let issues = detect_issues(&workspace(), &AnalysisOptions::default(), &failed);
        assert!(!rules(&issues).contains(&IssueRule::UnusedDependency));
    }

    #[test]
    fn test_dependency_rules() {
        let issues = detect_issues(&workspace(), &AnalysisOptions::default(), &completed());

        let unused: Vec<_> = issues
            .iter()
            .filter(|i| i.rule == IssueRule::UnusedDependency)
            .collect();
        // indirect requirements are never reported
        assert_eq!(unused.len(), 1);
        assert!(unused[0].message.contains("github.com/spf13/cobra"));

        let undeclared: Vec<_> = issues
            .iter()
            .filter(|i| i.rule == IssueRule::UndeclaredImport)
            .collect();
        assert_eq!(undeclared.len(), 1);
        assert!(undeclared[0].message.contains("github.com/lib/pq"));
    }

    #[test]
    fn test_replacement_declares_import() {
        let mut ws = workspace();
        ws.replacements = vec![crate::workspace::types::Replacement {
            from: "github.com/lib/pq".to_string(),
            to: "../pq".to_string(),
        }];
        let issues = detect_issues(&ws, &AnalysisOptions::default(), &completed());
        assert!(!rules(&issues).contains(&IssueRule::UndeclaredImport));
    }
}
