//! Go module manifest parser.
//!
//! Parses go.mod line by line. The parser never fails on content: a malformed
//! manifest yields whatever directives could be read, with empty strings for
//! the rest. Go has a unique import model where you import subpackages but only
//! declare root modules in go.mod, so lookups match on path prefixes.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::WorkspaceError;

use super::locate::MANIFEST_FILE;
use super::types::{path_within, DependencyInfo, Replacement};

/// Parsed contents of a go.mod file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoManifest {
    /// Module path (e.g., "k8s.io/kubernetes"). Empty when not declared.
    pub module_path: String,
    /// Language version from the `go` directive. Empty when not declared.
    pub go_version: String,
    /// Toolchain from the `toolchain` directive.
    pub toolchain: Option<String>,
    /// `require` entries in declaration order, unique by path.
    pub requirements: Vec<DependencyInfo>,
    /// `replace` directives in declaration order.
    pub replacements: Vec<Replacement>,
}

/// Which multi-line block the parser is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Replace,
    /// exclude, retract, tool, godebug: entries are skipped
    Other,
}

impl GoManifest {
    /// Read and parse `<root>/go.mod`.
    pub fn from_root(root: &Path) -> Result<Self, WorkspaceError> {
        let path = root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path)
            .map_err(|source| WorkspaceError::ManifestRead { path, source })?;
        Ok(Self::parse(&content))
    }

    /// Parse go.mod content.
    pub fn parse(content: &str) -> Self {
        let mut manifest = GoManifest::default();
        let mut block = Block::None;

        for raw in content.lines() {
            let (line, comment) = split_comment(raw);

            // Skip empty lines and comments
            if line.is_empty() {
                continue;
            }

            if block != Block::None {
                if line == ")" {
                    block = Block::None;
                    continue;
                }
                match block {
                    Block::Require => manifest.add_requirement(line, comment),
                    Block::Replace => manifest.add_replacement(line),
                    _ => {}
                }
                continue;
            }

            let (keyword, rest) = match line.split_once(char::is_whitespace) {
                Some((k, r)) => (k, r.trim()),
                None => match line.strip_suffix('(') {
                    // "require(" without a space
                    Some(k) => (k, "("),
                    None => (line, ""),
                },
            };

            match keyword {
                "module" => {
                    if manifest.module_path.is_empty() {
                        manifest.module_path = unquote(rest).to_string();
                    }
                }
                "go" => manifest.go_version = rest.to_string(),
                "toolchain" => manifest.toolchain = Some(rest.to_string()),
                "require" if rest == "(" => block = Block::Require,
                "require" => manifest.add_requirement(rest, comment),
                "replace" if rest == "(" => block = Block::Replace,
                "replace" => manifest.add_replacement(rest),
                _ if rest == "(" => block = Block::Other,
                other => debug!(directive = other, "ignoring go.mod directive"),
            }
        }

        manifest
    }

    fn add_requirement(&mut self, line: &str, comment: Option<&str>) {
        let Some((path, version)) = parse_require_line(line) else {
            return;
        };
        if self.requirements.iter().any(|d| d.path == path) {
            return;
        }
        let indirect = comment.map(is_indirect_marker).unwrap_or(false);
        self.requirements
            .push(DependencyInfo::new(path, version, indirect));
    }

    fn add_replacement(&mut self, line: &str) {
        if let Some((from, to)) = parse_replace_line(line) {
            self.replacements.push(Replacement { from, to });
        }
    }

    /// Check if an import path is a Go stdlib package.
    ///
    /// Go stdlib packages don't have dots in their first path component.
    /// Examples: "fmt", "net/http", "encoding/json"
    pub fn is_stdlib(import_path: &str) -> bool {
        let first_component = import_path.split('/').next().unwrap_or("");
        !first_component.contains('.')
    }

    /// Whether the import belongs to this module.
    pub fn is_internal(&self, import_path: &str) -> bool {
        path_within(import_path, &self.module_path)
    }

    /// Whether the import is neither stdlib nor internal.
    pub fn is_external(&self, import_path: &str) -> bool {
        !Self::is_stdlib(import_path) && !self.is_internal(import_path)
    }

    /// Whether an external import is covered by a require or replace directive.
    pub fn declares(&self, import_path: &str) -> bool {
        self.requirements.iter().any(|d| d.provides(import_path))
            || self
                .replacements
                .iter()
                .any(|r| path_within(import_path, &r.from))
    }
}

/// Split a line into its code part and the `//` comment, both trimmed.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.split_once("//") {
        Some((code, comment)) => (code.trim(), Some(comment.trim())),
        None => (line.trim(), None),
    }
}

fn is_indirect_marker(comment: &str) -> bool {
    comment == "indirect" || comment.starts_with("indirect;")
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '`')
}

/// Parse a require line: "google.golang.org/grpc v1.78.0"
fn parse_require_line(line: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [path, version, ..] => Some((unquote(path).to_string(), version.to_string())),
        // Module without version (rare but possible)
        [path] => Some((unquote(path).to_string(), String::new())),
        [] => None,
    }
}

/// Parse a replace line: "k8s.io/component-base => ./staging/src/k8s.io/component-base"
fn parse_replace_line(line: &str) -> Option<(String, String)> {
    let (from, to) = line.split_once("=>")?;
    let from = from.split_whitespace().next().unwrap_or("").to_string();
    let to = to.split_whitespace().collect::<Vec<_>>().join(" ");
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_go_mod() -> &'static str {
        r#"
// Kubernetes module
module k8s.io/kubernetes

go 1.22.0

toolchain go1.22.3

require (
	github.com/Azure/azure-sdk-for-go v68.0.0+incompatible
	github.com/aws/aws-sdk-go v1.50.32
	google.golang.org/grpc v1.78.0
	k8s.io/api v0.0.0
)

require (
	github.com/inconshreveable/mousetrap v1.1.0 // indirect
	github.com/spf13/pflag v1.0.5 // indirect
)

replace (
	k8s.io/api => ./staging/src/k8s.io/api
	k8s.io/component-base => ./staging/src/k8s.io/component-base
)

exclude (
	github.com/bad/module v1.0.0
)
"#
    }

    #[test]
    fn test_parse_go_mod() {
        let manifest = GoManifest::parse(sample_go_mod());

        assert_eq!(manifest.module_path, "k8s.io/kubernetes");
        assert_eq!(manifest.go_version, "1.22.0");
        assert_eq!(manifest.toolchain.as_deref(), Some("go1.22.3"));
        assert_eq!(manifest.requirements.len(), 6);
        assert_eq!(manifest.replacements.len(), 2);
        assert!(!manifest
            .requirements
            .iter()
            .any(|d| d.path == "github.com/bad/module"));
    }

    #[test]
    fn test_indirect_marker() {
        let manifest = GoManifest::parse(sample_go_mod());

        let pflag = manifest
            .requirements
            .iter()
            .find(|d| d.path == "github.com/spf13/pflag")
            .unwrap();
        assert!(pflag.indirect);
        assert_eq!(pflag.version, "v1.0.5");

        let grpc = manifest
            .requirements
            .iter()
            .find(|d| d.path == "google.golang.org/grpc")
            .unwrap();
        assert!(!grpc.indirect);
    }

    #[test]
    fn test_single_line_require() {
        let content = r#"
module example.com/mymodule

go 1.21

require github.com/pkg/errors v0.9.1
require golang.org/x/sync v0.6.0 // indirect
"#;
        let manifest = GoManifest::parse(content);
        assert_eq!(manifest.requirements.len(), 2);
        assert!(!manifest.requirements[0].indirect);
        assert!(manifest.requirements[1].indirect);
    }

    #[test]
    fn test_single_line_replace() {
        let content = r#"
module example.com/mymodule

replace example.com/old => example.com/new v1.0.0
"#;
        let manifest = GoManifest::parse(content);
        assert_eq!(
            manifest.replacements,
            vec![Replacement {
                from: "example.com/old".to_string(),
                to: "example.com/new v1.0.0".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_go_directive() {
        let manifest = GoManifest::parse("module example.com/m\n");
        assert_eq!(manifest.module_path, "example.com/m");
        assert_eq!(manifest.go_version, "");
        assert!(manifest.toolchain.is_none());
    }

    #[test]
    fn test_malformed_manifest_is_partial() {
        let content = "this is not\n{ a go.mod }\ngo 1.20\nrequire (\n  broken\n";
        let manifest = GoManifest::parse(content);
        assert_eq!(manifest.module_path, "");
        assert_eq!(manifest.go_version, "1.20");
        // unterminated block still yields its entries
        assert_eq!(manifest.requirements.len(), 1);
        assert_eq!(manifest.requirements[0].path, "broken");
        assert_eq!(manifest.requirements[0].version, "");
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = GoManifest::parse("");
        assert_eq!(manifest, GoManifest::default());
    }

    #[test]
    fn test_quoted_module_path() {
        let manifest = GoManifest::parse("module \"example.com/quoted\"\n");
        assert_eq!(manifest.module_path, "example.com/quoted");
    }

    #[test]
    fn test_import_classification() {
        let manifest = GoManifest::parse(sample_go_mod());

        assert!(GoManifest::is_stdlib("fmt"));
        assert!(GoManifest::is_stdlib("net/http"));
        assert!(!GoManifest::is_stdlib("github.com/aws/aws-sdk-go"));

        assert!(manifest.is_internal("k8s.io/kubernetes/pkg/api"));
        assert!(!manifest.is_external("k8s.io/kubernetes/pkg/api"));
        assert!(manifest.is_external("google.golang.org/grpc/credentials"));

        assert!(manifest.declares("google.golang.org/grpc/credentials"));
        assert!(manifest.declares("k8s.io/component-base/config"));
        assert!(!manifest.declares("github.com/nonexistent/package"));
    }

    #[test]
    fn test_from_root() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), sample_go_mod()).unwrap();

        let manifest = GoManifest::from_root(temp.path()).unwrap();
        assert_eq!(manifest.module_path, "k8s.io/kubernetes");
    }

    #[test]
    fn test_from_root_unreadable() {
        let temp = TempDir::new().unwrap();
        let err = GoManifest::from_root(temp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::ManifestRead { .. }));
    }
}
