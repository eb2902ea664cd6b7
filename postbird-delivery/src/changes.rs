//! Pending-change detection: uncommitted edits via `git status --porcelain`,
//! unpushed commits via `git rev-list --count`.

use std::path::Path;

use crate::error::DeliveryError;
use crate::git::Git;
use crate::runner::CommandRunner;

/// True when the working copy has anything staged, modified, or untracked.
pub fn has_pending_changes<R: CommandRunner + ?Sized>(
    git: &Git<'_, R>,
    working_copy: &Path,
) -> Result<bool, DeliveryError> {
    let out = git.metadata(working_copy, &["status", "--porcelain"])?;
    if !out.success() {
        return Err(DeliveryError::Commit(format!("status: {}", out.detail())));
    }
    Ok(!out.stdout.trim().is_empty())
}

/// Number of commits on HEAD that `origin/<branch>` does not have.
///
/// Non-zero after a delivery whose push failed: the commit exists locally
/// and still has to reach the remote.
pub fn unpushed_commits<R: CommandRunner + ?Sized>(
    git: &Git<'_, R>,
    working_copy: &Path,
    branch: &str,
) -> Result<usize, DeliveryError> {
    let range = format!("origin/{branch}..HEAD");
    let out = git.metadata(working_copy, &["rev-list", "--count", &range])?;
    if !out.success() {
        return Err(DeliveryError::Commit(format!("rev-list: {}", out.detail())));
    }
    out.stdout.trim().parse().map_err(|_| {
        DeliveryError::Commit(format!(
            "rev-list: unexpected output {:?}",
            out.stdout.trim()
        ))
    })
}
