//! Test coverage via `go test -coverprofile`.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use super::command::run_tool;
use super::types::TestCoverageInfo;

lazy_static! {
    /// `file:startLine.startCol,endLine.endCol numStmts count`
    static ref PROFILE_LINE: Regex =
        Regex::new(r"^(?P<file>.+):\d+\.\d+,\d+\.\d+ (?P<stmts>\d+) (?P<count>\d+)$").unwrap();
}

/// Run the module's tests with a coverage profile and summarize it.
///
/// The profile lives in a temporary directory removed when this function
/// returns or its future is dropped.
pub async fn collect_coverage(
    root: &Path,
    go: &str,
    timeout: Option<Duration>,
) -> anyhow::Result<TestCoverageInfo> {
    let scratch = tempfile::Builder::new()
        .prefix("goinspect-cover-")
        .tempdir()
        .context("creating coverage scratch directory")?;
    let profile = scratch.path().join("coverage.out");
    let profile_flag = format!("-coverprofile={}", profile.display());

    info!("running tests with coverage");
    run_tool(go, &["test", profile_flag.as_str(), "./..."], root, timeout).await?;

    let content = tokio::fs::read_to_string(&profile)
        .await
        .with_context(|| format!("reading {}", profile.display()))?;
    Ok(parse_profile(&content))
}

#[derive(Default)]
struct Tally {
    total: usize,
    covered: usize,
}

impl Tally {
    fn record(&mut self, count: u64) {
        self.total += 1;
        if count > 0 {
            self.covered += 1;
        }
    }

    fn percentage(&self) -> f64 {
        percentage(self.covered, self.total)
    }
}

/// Summarize a coverage profile.
///
/// Every block line counts once toward the total and once toward covered
/// when its execution count is positive. Package keys are the directory part
/// of the block's file path. Unrecognized lines are ignored.
pub fn parse_profile(content: &str) -> TestCoverageInfo {
    let mut overall = Tally::default();
    let mut packages: BTreeMap<String, Tally> = BTreeMap::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with("mode:") {
            continue;
        }
        let Some(caps) = PROFILE_LINE.captures(line) else {
            debug!(line, "ignoring coverage profile line");
            continue;
        };
        let count: u64 = caps["count"].parse().unwrap_or(0);
        let file = &caps["file"];
        let package = file.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        overall.record(count);
        packages.entry(package.to_string()).or_default().record(count);
    }

    TestCoverageInfo {
        total_lines: overall.total,
        covered_lines: overall.covered,
        percentage: overall.percentage(),
        package_coverage: packages
            .into_iter()
            .map(|(pkg, tally)| (pkg, tally.percentage()))
            .collect(),
        timestamp: Utc::now(),
    }
}

/// `covered / total * 100`, or 0 when there is nothing to cover.
pub fn percentage(covered: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}
