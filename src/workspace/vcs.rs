//! git metadata for the module root.

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use super::command::run_tool;
use super::types::GitInfo;

/// Whether `root` or one of its ancestors holds a `.git` entry.
pub fn has_repository(root: &Path) -> bool {
    root.ancestors().any(|dir| dir.join(".git").exists())
}

/// Collect branch, head commit, dirty state and origin remote.
///
/// Without repository metadata the result is `is_repo: false` and no command
/// runs. An error means git itself could not be queried. Once the repository
/// is confirmed, a failing query only leaves its own field empty.
pub async fn inspect_git(
    root: &Path,
    git: &str,
    timeout: Option<Duration>,
) -> anyhow::Result<GitInfo> {
    if !has_repository(root) {
        return Ok(GitInfo::default());
    }

    run_tool(git, &["rev-parse", "--is-inside-work-tree"], root, timeout).await?;

    let query = |args: &'static [&'static str]| async move {
        match run_tool(git, args, root, timeout).await {
            Ok(out) => out,
            Err(e) => {
                debug!(error = %e, "git query failed");
                String::new()
            }
        }
    };

    let branch = query(&["rev-parse", "--abbrev-ref", "HEAD"]).await;
    let commit_hash = query(&["rev-parse", "HEAD"]).await;
    let commit_message = query(&["log", "-1", "--format=%s"]).await;
    let commit_author = query(&["log", "-1", "--format=%an"]).await;
    let status = query(&["status", "--porcelain"]).await;
    let remote_url = query(&["remote", "get-url", "origin"]).await;

    Ok(GitInfo {
        is_repo: true,
        branch,
        commit_hash,
        commit_message,
        commit_author,
        is_dirty: !status.is_empty(),
        remote_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    /// Run git synchronously for fixture setup; false when git is missing.
    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(["-c", "user.name=Ann", "-c", "user.email=ann@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_no_repository() {
        let temp = TempDir::new().unwrap();
        if has_repository(temp.path()) {
            // temp dir lives inside a checkout; nothing to assert
            return;
        }
        let info = inspect_git(temp.path(), "git", Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(info, GitInfo::default());
    }

    #[tokio::test]
    async fn test_git_unavailable() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let result = inspect_git(
            temp.path(),
            "goinspect-no-such-git",
            Some(Duration::from_secs(5)),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_has_repository_checks_ancestors() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let nested = temp.path().join("svc/api");
        std::fs::create_dir_all(&nested).unwrap();
        assert!(has_repository(&nested));
    }

    #[tokio::test]
    async fn test_existing_repository() {
        let temp = TempDir::new().unwrap();
        if !git(temp.path(), &["init", "-q"]) {
            // git not installed
            return;
        }
        assert!(git(temp.path(), &["symbolic-ref", "HEAD", "refs/heads/trunk"]));
        std::fs::write(temp.path().join("go.mod"), "module example.com/m\n").unwrap();
        assert!(git(temp.path(), &["add", "go.mod"]));
        assert!(git(temp.path(), &["commit", "-q", "-m", "initial import"]));

        let timeout = Some(Duration::from_secs(10));
        let info = inspect_git(temp.path(), "git", timeout).await.unwrap();
        assert!(info.is_repo);
        assert_eq!(info.branch, "trunk");
        assert_eq!(info.commit_hash.len(), 40);
        assert_eq!(info.commit_message, "initial import");
        assert_eq!(info.commit_author, "Ann");
        assert!(!info.is_dirty);
        // no origin configured
        assert_eq!(info.remote_url, "");

        std::fs::write(temp.path().join("main.go"), "package main\n").unwrap();
        let info = inspect_git(temp.path(), "git", timeout).await.unwrap();
        assert!(info.is_dirty);
    }
}
