//! Bounded external command execution.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use tokio::process::Command;
use tracing::debug;

/// Run `program args...` in `dir` and return its trimmed stdout.
///
/// The child is killed if `timeout` elapses or the returned future is
/// dropped. `None` waits indefinitely. A non-zero exit status is an error
/// carrying stderr.
pub async fn run_tool(
    program: &str,
    args: &[&str],
    dir: &Path,
    timeout: Option<Duration>,
) -> anyhow::Result<String> {
    let cmdline = format!("{} {}", program, args.join(" "));
    debug!(command = %cmdline, dir = %dir.display(), "running");

    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, command.output())
            .await
            .map_err(|_| anyhow!("`{}` timed out after {}s", cmdline, limit.as_secs()))?,
        None => command.output().await,
    }
    .with_context(|| format!("failed to run `{}`", cmdline))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("`{}` exited with {}: {}", cmdline, output.status, stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
