//! Workspace-wide metrics.

use super::types::{Metrics, WorkspaceInfo};

/// Aggregate counts over every package.
///
/// Average complexity is 0 when there are no functions; coverage is 0 when
/// it was not collected.
pub fn compute_metrics(workspace: &WorkspaceInfo) -> Metrics {
    let mut metrics = Metrics {
        total_packages: workspace.packages.len(),
        ..Metrics::default()
    };

    let mut complexity_sum: u64 = 0;
    for package in &workspace.packages {
        metrics.total_files += package.file_count;
        metrics.total_lines += package.line_count;
        metrics.total_structs += package.structs.len();
        metrics.total_interfaces += package.interfaces.len();
        metrics.test_files += package.test_files.len();

        for func in &package.functions {
            metrics.total_functions += 1;
            complexity_sum += u64::from(func.complexity);
            metrics.max_complexity = metrics.max_complexity.max(func.complexity);
            if func.exported {
                metrics.exported_functions += 1;
            }
            if func.is_test {
                metrics.test_functions += 1;
            }
        }
    }

    if metrics.total_functions > 0 {
        metrics.average_complexity = complexity_sum as f64 / metrics.total_functions as f64;
    }
    metrics.coverage_percentage = workspace
        .test_coverage
        .as_ref()
        .map(|c| c.percentage)
        .unwrap_or(0.0);

    metrics
}
