//! Analysis options and their YAML representation.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default option file names searched by the CLI.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["goinspect.yaml", ".goinspect.yaml"];

/// Switches and limits for one analysis. Immutable for the duration of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Parse `_test.go` files.
    pub include_test_files: bool,
    /// Cross-reference go.mod requirements against imports.
    pub include_dependencies: bool,
    /// Query git for branch, head commit, dirty state and remote.
    pub include_git_info: bool,
    /// Run `go test -coverprofile` over all packages.
    pub include_coverage: bool,
    /// Query `go version` / `go env`.
    pub include_build_info: bool,
    /// Maximum directory depth below the root. 0 means unlimited.
    pub max_depth: usize,
    /// Skip the `vendor/` subtree.
    pub exclude_vendor: bool,
    /// Glob patterns (relative to the root) of paths to skip.
    pub excluded_paths: Vec<String>,
    pub thresholds: Thresholds,
    /// Upper bound for each external command, in seconds. 0 means no limit.
    pub command_timeout_secs: u64,
    /// Go toolchain binary.
    pub go_binary: String,
    /// git binary.
    pub git_binary: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_test_files: true,
            include_dependencies: true,
            include_git_info: true,
            include_coverage: false,
            include_build_info: true,
            max_depth: 0,
            exclude_vendor: true,
            excluded_paths: Vec::new(),
            thresholds: Thresholds::default(),
            command_timeout_secs: 300,
            go_binary: "go".to_string(),
            git_binary: "git".to_string(),
        }
    }
}

impl AnalysisOptions {
    /// Parse options from a YAML file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let options: AnalysisOptions = serde_yaml::from_str(&content)?;
        Ok(options)
    }

    /// Options with every external-process phase switched off.
    pub fn offline() -> Self {
        Self {
            include_git_info: false,
            include_coverage: false,
            include_build_info: false,
            ..Self::default()
        }
    }

    /// Per-command time limit, `None` when unlimited.
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }
}

/// Limits used by the issue detector and suggestion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Functions above this complexity are reported.
    pub max_complexity: u32,
    /// Go versions below this get an upgrade suggestion.
    pub min_go_version: String,
    /// Coverage percentage below this gets a testing suggestion.
    pub min_coverage: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_complexity: 10,
            min_go_version: "1.21".to_string(),
            min_coverage: 60.0,
        }
    }
}
