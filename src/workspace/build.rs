//! Toolchain information from `go version` and `go env`.

use std::path::Path;
use std::time::Duration;

use anyhow::anyhow;
use tracing::debug;

use super::command::run_tool;
use super::types::BuildInfo;

/// Query the toolchain. GOROOT is optional; the version is not.
pub async fn inspect_build(
    root: &Path,
    go: &str,
    timeout: Option<Duration>,
) -> anyhow::Result<BuildInfo> {
    let output = run_tool(go, &["version"], root, timeout).await?;
    let mut info = parse_version_output(&output)
        .ok_or_else(|| anyhow!("unrecognized `{} version` output: {}", go, output))?;

    match run_tool(go, &["env", "GOROOT"], root, timeout).await {
        Ok(goroot) if !goroot.is_empty() => info.goroot = Some(goroot),
        Ok(_) => {}
        Err(e) => debug!(error = %e, "GOROOT unavailable"),
    }

    Ok(info)
}

/// Parse "go version go1.22.1 linux/amd64".
pub fn parse_version_output(output: &str) -> Option<BuildInfo> {
    let mut tokens = output.split_whitespace();
    if tokens.next()? != "go" || tokens.next()? != "version" {
        return None;
    }
    let go_version = tokens.next()?.strip_prefix("go")?.to_string();
    let platform = tokens.next().unwrap_or_default().to_string();
    Some(BuildInfo {
        go_version,
        platform,
        goroot: None,
    })
}
