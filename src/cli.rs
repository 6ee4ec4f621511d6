//! Command-line interface for goinspect.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::report;
use crate::workspace::{detect_workspace, AnalysisOptions, Severity, DEFAULT_CONFIG_NAMES};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Go workspace analysis - structure, complexity, coverage and project health.
///
/// goinspect locates the Go module containing a path, parses every source
/// file, and reports packages, functions, dependencies, git and toolchain
/// state together with complexity issues and improvement suggestions.
#[derive(Parser)]
#[command(name = "goinspect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overrides GOINSPECT_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the Go module containing PATH
    #[command(visible_alias = "inspect")]
    Analyze(AnalyzeArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path inside the module (file or directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to options YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or yaml
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Skip _test.go files
    #[arg(long)]
    pub no_tests: bool,

    /// Skip dependency cross-referencing
    #[arg(long)]
    pub no_deps: bool,

    /// Skip git metadata
    #[arg(long)]
    pub no_git: bool,

    /// Run `go test -coverprofile` over all packages
    #[arg(long)]
    pub coverage: bool,

    /// Skip `go version` / `go env`
    #[arg(long)]
    pub no_build: bool,

    /// Walk into vendor/
    #[arg(long)]
    pub include_vendor: bool,

    /// Maximum directory depth below the module root (0 = unlimited)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Report functions whose complexity exceeds this
    #[arg(long)]
    pub max_complexity: Option<u32>,

    /// Suggest upgrading when go.mod declares an older Go version
    #[arg(long)]
    pub min_go_version: Option<String>,

    /// Timeout in seconds for each external command (0 = no limit)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Exit with 1 when warnings or errors are reported
    #[arg(long)]
    pub fail_on_warnings: bool,
}

impl AnalyzeArgs {
    /// Apply command-line overrides on top of file or default options.
    pub fn apply(&self, mut options: AnalysisOptions) -> AnalysisOptions {
        if self.no_tests {
            options.include_test_files = false;
        }
        if self.no_deps {
            options.include_dependencies = false;
        }
        if self.no_git {
            options.include_git_info = false;
        }
        if self.coverage {
            options.include_coverage = true;
        }
        if self.no_build {
            options.include_build_info = false;
        }
        if self.include_vendor {
            options.exclude_vendor = false;
        }
        if let Some(depth) = self.max_depth {
            options.max_depth = depth;
        }
        if let Some(max) = self.max_complexity {
            options.thresholds.max_complexity = max;
        }
        if let Some(version) = &self.min_go_version {
            options.thresholds.min_go_version = version.clone();
        }
        if let Some(secs) = self.timeout {
            options.command_timeout_secs = secs;
        }
        options
    }
}

/// Find an options file next to the analyzed path, then in the current directory.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let start_dir = if start.is_file() {
        start.parent().unwrap_or(start)
    } else {
        start
    };
    [start_dir, Path::new(".")]
        .iter()
        .flat_map(|dir| DEFAULT_CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn load_options(args: &AnalyzeArgs) -> anyhow::Result<AnalysisOptions> {
    let file = match &args.config {
        Some(path) => Some(path.clone()),
        None => discover_config(&args.path),
    };
    let base = match file {
        Some(path) => {
            debug!(config = %path.display(), "loading options");
            AnalysisOptions::from_file(&path)
                .map_err(|e| anyhow::anyhow!("invalid options file {}: {}", path.display(), e))?
        }
        None => AnalysisOptions::default(),
    };
    Ok(args.apply(base))
}

fn spinner(show: bool) -> ProgressBar {
    if !show || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    pb.set_message("analyzing workspace");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if !report::FORMATS.contains(&args.format.as_str()) {
        eprintln!(
            "Error: invalid format {:?}, must be one of {}",
            args.format,
            report::FORMATS.join(", ")
        );
        return Ok(EXIT_ERROR);
    }

    let options = match load_options(args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let progress = spinner(args.format == "pretty");
    let outcome = runtime.block_on(detect_workspace(&args.path, &options));
    progress.finish_and_clear();

    let result = match outcome {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format.as_str() {
        "json" => report::write_json(&result)?,
        "yaml" => report::write_yaml(&result)?,
        _ => report::write_pretty(&result),
    }

    let flagged = result
        .issues
        .iter()
        .any(|i| matches!(i.severity, Severity::Error | Severity::Warning));
    if args.fail_on_warnings && flagged {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
