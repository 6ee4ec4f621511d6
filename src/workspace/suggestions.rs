//! Improvement suggestions that are not tied to a defect.

use std::cmp::Ordering;

use super::options::Thresholds;
use super::types::{Category, Priority, Suggestion, WorkspaceInfo};

/// README names checked at the module root.
pub const README_FILES: &[&str] = &[
    "README.md",
    "README",
    "README.txt",
    "README.rst",
    "readme.md",
    "Readme.md",
];

/// CI configuration locations checked at the module root.
pub const CI_PATHS: &[&str] = &[
    ".github/workflows",
    ".gitlab-ci.yml",
    ".circleci",
    ".travis.yml",
    "Jenkinsfile",
    "azure-pipelines.yml",
    "bitbucket-pipelines.yml",
    ".drone.yml",
];

const CI_EXAMPLE: &str = "# .github/workflows/go.yml
name: Go
on: [push, pull_request]
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: actions/setup-go@v5
        with:
          go-version-file: go.mod
      - run: go vet ./...
      - run: go test ./...";

/// Produce suggestions in a fixed order: Go version, README, CI, coverage.
pub fn generate_suggestions(workspace: &WorkspaceInfo, thresholds: &Thresholds) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if is_older_go(&workspace.go_version, &thresholds.min_go_version) {
        suggestions.push(Suggestion {
            category: Category::Maintenance,
            priority: Priority::Medium,
            title: "Upgrade Go version".to_string(),
            description: format!(
                "go.mod declares go {}; {} or newer is recommended for current toolchain fixes and language features",
                workspace.go_version, thresholds.min_go_version
            ),
            file: Some("go.mod".to_string()),
            example: Some(format!("go mod edit -go={}", thresholds.min_go_version)),
        });
    }

    if !README_FILES.iter().any(|f| workspace.root.join(f).exists()) {
        suggestions.push(Suggestion {
            category: Category::Documentation,
            priority: Priority::Low,
            title: "Add a README".to_string(),
            description: "The module has no README describing its purpose and usage".to_string(),
            file: Some("README.md".to_string()),
            example: Some(format!(
                "# {}\n\n## Install\n\n    go get {}\n",
                workspace.module_path, workspace.module_path
            )),
        });
    }

    if !CI_PATHS.iter().any(|p| workspace.root.join(p).exists()) {
        suggestions.push(Suggestion {
            category: Category::Automation,
            priority: Priority::Medium,
            title: "Set up continuous integration".to_string(),
            description: "No CI configuration found; run vet and tests on every change"
                .to_string(),
            file: None,
            example: Some(CI_EXAMPLE.to_string()),
        });
    }

    if let Some(coverage) = &workspace.test_coverage {
        if coverage.percentage < thresholds.min_coverage {
            suggestions.push(Suggestion {
                category: Category::Testing,
                priority: Priority::High,
                title: "Increase test coverage".to_string(),
                description: format!(
                    "Statement coverage is {:.1}%, below the {:.1}% target",
                    coverage.percentage, thresholds.min_coverage
                ),
                file: None,
                example: Some("go test -coverprofile=cover.out ./... && go tool cover -html=cover.out".to_string()),
            });
        }
    }

    suggestions
}

/// Numeric components of a Go version ("1.22.1", "go1.21", "1.23rc1").
///
/// Parsing stops at the first component without a leading digit.
pub fn parse_go_version(version: &str) -> Option<Vec<u64>> {
    let version = version.trim();
    let version = version.strip_prefix("go").unwrap_or(version);
    let mut parts = Vec::new();
    for component in version.split('.') {
        let digits: String = component.chars().take_while(|c| c.is_ascii_digit()).collect();
        match digits.parse() {
            Ok(n) => parts.push(n),
            Err(_) => break,
        }
        if digits.len() < component.len() {
            break;
        }
    }
    (!parts.is_empty()).then_some(parts)
}

/// Compare Go versions component-wise; missing components count as zero.
pub fn compare_go_versions(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Whether `declared` parses and is strictly older than `minimum`.
fn is_older_go(declared: &str, minimum: &str) -> bool {
    match (parse_go_version(declared), parse_go_version(minimum)) {
        (Some(d), Some(m)) => compare_go_versions(&d, &m) == Ordering::Less,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::types::TestCoverageInfo;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn titles(s: &[Suggestion]) -> Vec<&str> {
        s.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_bare_module_gets_all_but_coverage() {
        let temp = TempDir::new().unwrap();
        let mut ws = WorkspaceInfo::new(temp.path(), "example.com/m");
        ws.go_version = "1.19".to_string();

        let suggestions = generate_suggestions(&ws, &Thresholds::default());
        assert_eq!(
            titles(&suggestions),
            vec!["Upgrade Go version", "Add a README", "Set up continuous integration"]
        );
        assert_eq!(suggestions[0].category, Category::Maintenance);
        assert_eq!(suggestions[1].category, Category::Documentation);
        assert_eq!(suggestions[2].category, Category::Automation);
    }

    #[test]
    fn test_readme_and_ci_present() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "# m\n").unwrap();
        fs::create_dir_all(temp.path().join(".github/workflows")).unwrap();
        let mut ws = WorkspaceInfo::new(temp.path(), "example.com/m");
        ws.go_version = "1.22".to_string();

        assert!(generate_suggestions(&ws, &Thresholds::default()).is_empty());
    }

    #[test]
    fn test_empty_go_version_is_not_upgraded() {
        let temp = TempDir::new().unwrap();
        let ws = WorkspaceInfo::new(temp.path(), "example.com/m");
        let suggestions = generate_suggestions(&ws, &Thresholds::default());
        assert!(!titles(&suggestions).contains(&"Upgrade Go version"));
    }

    #[test]
    fn test_low_coverage() {
        let temp = TempDir::new().unwrap();
        let mut ws = WorkspaceInfo::new(temp.path(), "example.com/m");
        ws.test_coverage = Some(TestCoverageInfo {
            total_lines: 10,
            covered_lines: 3,
            percentage: 30.0,
            package_coverage: BTreeMap::new(),
            timestamp: Utc::now(),
        });
        let suggestions = generate_suggestions(&ws, &Thresholds::default());
        let last = suggestions.last().unwrap();
        assert_eq!(last.category, Category::Testing);
        assert_eq!(last.priority, Priority::High);
    }

    #[test]
    fn test_parse_go_version() {
        assert_eq!(parse_go_version("1.22.1"), Some(vec![1, 22, 1]));
        assert_eq!(parse_go_version("go1.21"), Some(vec![1, 21]));
        assert_eq!(parse_go_version("1.23rc1"), Some(vec![1, 23]));
        assert_eq!(parse_go_version(""), None);
        assert_eq!(parse_go_version("latest"), None);
    }

    #[test]
    fn test_version_ordering() {
        assert!(is_older_go("1.20", "1.21"));
        assert!(is_older_go("1.9", "1.21"));
        assert!(!is_older_go("1.21", "1.21"));
        assert!(!is_older_go("1.21.0", "1.21"));
        assert!(!is_older_go("1.22.3", "1.21"));
        assert!(!is_older_go("", "1.21"));
    }
}
