//! Read-only working copy inspection for `postbird status` / `postbird check`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use postbird_core::{RepositoryTarget, Timeouts};

use crate::error::{DeliveryError, ExecutionError};
use crate::git::{Git, GIT};
use crate::runner::CommandRunner;

const FIELD_SEP: char = '\x1f';

/// Most recent commit on the checked-out branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastCommit {
    pub hash: String,
    pub author: String,
    pub email: String,
    pub message: String,
    /// Committer date, strict ISO 8601 as printed by git.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepositoryStatus {
    /// No working copy at the configured path.
    NotInitialized { path: PathBuf },
    Ready {
        path: PathBuf,
        branch: String,
        /// `None` for a repository without commits.
        last_commit: Option<LastCommit>,
        has_uncommitted_changes: bool,
    },
}

/// Describe the working copy at `target.local_path`.
pub fn repository_status<R: CommandRunner + ?Sized>(
    runner: &R,
    timeouts: Timeouts,
    target: &RepositoryTarget,
) -> Result<RepositoryStatus, DeliveryError> {
    let path = target.local_path.as_path();
    if !path.join(".git").exists() {
        return Ok(RepositoryStatus::NotInitialized {
            path: path.to_path_buf(),
        });
    }
    let git = Git::new(runner, timeouts);

    let out = git.metadata(path, &["branch", "--show-current"])?;
    if !out.success() {
        return Err(DeliveryError::Sync(format!("branch: {}", out.detail())));
    }
    let branch = out.stdout.trim().to_string();

    let format = format!("--format=%H{FIELD_SEP}%an{FIELD_SEP}%ae{FIELD_SEP}%s{FIELD_SEP}%cI");
    let out = git.metadata(path, &["log", "-1", &format])?;
    // `git log` exits non-zero on an unborn branch.
    let last_commit = if out.success() {
        parse_log_line(out.stdout.trim_end_matches('\n'))
    } else {
        None
    };

    let out = git.metadata(path, &["status", "--porcelain"])?;
    if !out.success() {
        return Err(DeliveryError::Sync(format!("status: {}", out.detail())));
    }

    Ok(RepositoryStatus::Ready {
        path: path.to_path_buf(),
        branch,
        last_commit,
        has_uncommitted_changes: !out.stdout.trim().is_empty(),
    })
}

fn parse_log_line(line: &str) -> Option<LastCommit> {
    let mut parts = line.splitn(5, FIELD_SEP);
    let hash = parts.next()?.trim();
    if hash.is_empty() {
        return None;
    }
    Some(LastCommit {
        hash: hash.to_string(),
        author: parts.next()?.to_string(),
        email: parts.next()?.to_string(),
        message: parts.next()?.to_string(),
        date: parts.next()?.to_string(),
    })
}

/// `git --version`, e.g. `git version 2.43.0`. `None` when git runs but
/// reports failure.
pub fn git_version<R: CommandRunner + ?Sized>(
    runner: &R,
    timeouts: Timeouts,
) -> Result<Option<String>, ExecutionError> {
    let out = runner.run(GIT, &["--version"], Path::new("."), timeouts.metadata())?;
    Ok(out.success().then(|| out.stdout.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::runner::SystemRunner;

    #[test]
    fn parses_log_line() {
        let line = "abc123\x1fBlog Bird Agent\x1fblogbird@example.com\x1fAdd blog post: X\x1f2025-03-01T08:30:00+00:00";
        let commit = parse_log_line(line).unwrap();
        assert_eq!(commit.hash, "abc123");
        assert_eq!(commit.author, "Blog Bird Agent");
        assert_eq!(commit.email, "blogbird@example.com");
        assert_eq!(commit.message, "Add blog post: X");
        assert_eq!(commit.date, "2025-03-01T08:30:00+00:00");
    }

    #[test]
    fn truncated_log_line_is_none() {
        assert!(parse_log_line("").is_none());
        assert!(parse_log_line("abc\x1fonly-author").is_none());
    }

    #[test]
    fn missing_working_copy_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        let target = RepositoryTarget {
            url: "https://example.com/o/blog.git".into(),
            local_path: dir.path().join("absent"),
            ..RepositoryTarget::default()
        };
        let status = repository_status(&SystemRunner::new(), Timeouts::default(), &target).unwrap();
        assert_eq!(
            status,
            RepositoryStatus::NotInitialized {
                path: dir.path().join("absent")
            }
        );
    }

    #[test]
    fn status_serializes_with_tag() {
        let status = RepositoryStatus::NotInitialized {
            path: PathBuf::from("/tmp/wc"),
        };
        let yaml = serde_yaml::to_string(&status).unwrap();
        assert!(yaml.contains("status: not_initialized"), "{yaml}");
    }
}
