//! Output formatting for analysis results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - YAML: the same document as JSON, for config-minded pipelines

use colored::*;
use serde::Serialize;

use crate::workspace::{
    AnalysisResult, Issue, Metrics, PhaseReport, PhaseStatus, Severity, Suggestion, WorkspaceInfo,
};

/// Output formats accepted by `--format`.
pub const FORMATS: &[&str] = &["pretty", "json", "yaml"];

/// Top-level machine-readable report.
#[derive(Serialize)]
pub struct Report<'a> {
    pub version: &'static str,
    #[serde(flatten)]
    pub result: &'a AnalysisResult,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a AnalysisResult) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            result,
        }
    }
}

/// Serialize the result as pretty-printed JSON.
pub fn render_json(result: &AnalysisResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&Report::new(result))?)
}

/// Serialize the result as YAML.
pub fn render_yaml(result: &AnalysisResult) -> anyhow::Result<String> {
    Ok(serde_yaml::to_string(&Report::new(result))?)
}

pub fn write_json(result: &AnalysisResult) -> anyhow::Result<()> {
    println!("{}", render_json(result)?);
    Ok(())
}

pub fn write_yaml(result: &AnalysisResult) -> anyhow::Result<()> {
    print!("{}", render_yaml(result)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(result: &AnalysisResult) {
    let ws = &result.workspace;

    println!();
    print!("  ");
    print!("{}", "goinspect".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    write_workspace_summary(ws);
    println!();

    write_metrics(&result.metrics);
    println!();

    write_phases(&result.phases);
    println!();

    if !ws.parse_failures.is_empty() {
        println!("  {} ({}):", "Skipped files".yellow(), ws.parse_failures.len());
        for failure in &ws.parse_failures {
            println!("    {}  {}", failure.file.blue(), failure.message.dimmed());
        }
        println!();
    }

    if !result.issues.is_empty() {
        write_issues(&result.issues);
        println!();
    }

    if !result.suggestions.is_empty() {
        write_suggestions(&result.suggestions);
        println!();
    }

    write_final_status(&result.issues);
    println!();
}

fn write_workspace_summary(ws: &WorkspaceInfo) {
    let label = |s: &str| format!("{:<11}", s).dimmed();

    println!("  {}{}", label("Module:"), display_or_dash(&ws.module_path));
    println!("  {}{}", label("Root:"), ws.root.display());
    println!("  {}{}", label("Type:"), ws.project_type.to_string().bold());

    let mut go = display_or_dash(&ws.go_version).to_string();
    if let Some(toolchain) = &ws.toolchain {
        go.push_str(&format!(" ({})", toolchain));
    }
    println!("  {}{}", label("Go:"), go);

    if let Some(build) = &ws.build_info {
        println!(
            "  {}go{} {}",
            label("Toolchain:"),
            build.go_version,
            build.platform
        );
    }

    if let Some(git) = &ws.git_info {
        if git.is_repo {
            let short = git.commit_hash.get(..8).unwrap_or(&git.commit_hash);
            let dirty = if git.is_dirty {
                " (dirty)".yellow().to_string()
            } else {
                String::new()
            };
            println!(
                "  {}{} @ {}{}",
                label("Git:"),
                display_or_dash(&git.branch),
                display_or_dash(short),
                dirty
            );
        }
    }

    let direct = ws.dependencies.iter().filter(|d| d.is_direct()).count();
    println!(
        "  {}{} direct, {} indirect",
        label("Deps:"),
        direct,
        ws.dependencies.len() - direct
    );
}

fn write_metrics(m: &Metrics) {
    println!("  {}", "Metrics:".bold());
    println!(
        "    {:<22} {:>6}    {:<22} {:>6}",
        "packages", m.total_packages, "files", m.total_files
    );
    println!(
        "    {:<22} {:>6}    {:<22} {:>6}",
        "lines", m.total_lines, "functions", m.total_functions
    );
    println!(
        "    {:<22} {:>6}    {:<22} {:>6}",
        "structs", m.total_structs, "interfaces", m.total_interfaces
    );
    println!(
        "    {:<22} {:>6}    {:<22} {:>6}",
        "test files", m.test_files, "test functions", m.test_functions
    );
    print!(
        "    {:<22} {:>6.2}    {:<22} ",
        "avg complexity", m.average_complexity, "max complexity"
    );
    write_colored_complexity(m.max_complexity);
    println!();
    if m.coverage_percentage > 0.0 {
        println!("    {:<22} {:>5.1}%", "coverage", m.coverage_percentage);
    }
}

fn write_colored_complexity(c: u32) {
    let text = format!("{:>6}", c);
    match c {
        0..=10 => print!("{}", text.green()),
        11..=20 => print!("{}", text.yellow()),
        _ => print!("{}", text.red()),
    }
}

fn write_phases(phases: &PhaseReport) {
    print!("  {}", "Phases:".bold());
    for (name, status) in phases.entries() {
        let tag = match status {
            PhaseStatus::Completed => "ok".green(),
            PhaseStatus::Disabled => "off".dimmed(),
            PhaseStatus::Failed(_) => "failed".red(),
        };
        print!("  {}={}", name, tag);
    }
    println!();

    for (name, status) in phases.entries() {
        if let PhaseStatus::Failed(reason) = status {
            println!("    {} {}", format!("{}:", name).red(), reason.dimmed());
        }
    }
}

fn write_issues(issues: &[Issue]) {
    println!("  {} ({}):", "Issues".bold(), issues.len());
    println!();

    for issue in issues {
        write_severity_tag(&issue.severity);
        print!("   ");
        print!("{:<19}", issue.rule.as_str().dimmed());
        print!("{}", issue.file.blue());
        if issue.line > 0 {
            print!("{}", format!(":{}", issue.line).dimmed());
        }
        println!();

        println!("            {}", issue.message);
        if let Some(hint) = &issue.suggestion {
            println!("            {}", hint.dimmed());
        }
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_suggestions(suggestions: &[Suggestion]) {
    println!("  {} ({}):", "Suggestions".bold(), suggestions.len());
    println!();

    for s in suggestions {
        print!("    [{}] ", s.priority.to_string().to_uppercase().cyan());
        print!("{}", s.title.bold());
        println!("  {}", s.category.display_name().dimmed());
        println!("            {}", s.description);
        if let Some(example) = &s.example {
            for line in example.lines() {
                println!("              {}", line.dimmed());
            }
        }
        println!();
    }
}

fn write_final_status(issues: &[Issue]) {
    let count = |sev: Severity| issues.iter().filter(|i| i.severity == sev).count();
    let (errors, warnings, infos) = (
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info),
    );

    print!("  ");
    if errors == 0 && warnings == 0 {
        print!("{}", "CLEAN".green());
    } else {
        print!("{}", "ATTENTION".yellow());
    }
    println!(
        "  {}",
        format!("{} errors, {} warnings, {} info", errors, warnings, infos).dimmed()
    );
}

fn display_or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}
