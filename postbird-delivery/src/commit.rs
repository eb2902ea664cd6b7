//! Commit/push engine.
//!
//! [`commit`] and [`push`] are separate so the state machine can record one
//! transition for each. [`commit_and_push`] chains them for callers that do
//! not need the split.

use std::path::Path;

use postbird_core::CommitId;

use crate::changes::has_pending_changes;
use crate::error::DeliveryError;
use crate::git::Git;
use crate::runner::CommandRunner;

/// Placeholder substituted by [`format_message`].
pub const TITLE_PLACEHOLDER: &str = "{title}";

/// Result of attempting a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(CommitId),
    /// The working tree had nothing to record.
    NothingToCommit,
}

/// Replace every `{title}` in `template`. A template without the placeholder
/// is used literally.
pub fn format_message(template: &str, title: &str) -> String {
    template.replace(TITLE_PLACEHOLDER, title)
}

/// `git commit -m <message>`, then resolve the new HEAD.
///
/// A failed commit with a clean working tree is [`CommitOutcome::NothingToCommit`].
pub fn commit<R: CommandRunner + ?Sized>(
    git: &Git<'_, R>,
    working_copy: &Path,
    message: &str,
) -> Result<CommitOutcome, DeliveryError> {
    let out = git.metadata(working_copy, &["commit", "-m", message])?;
    if !out.success() {
        if !has_pending_changes(git, working_copy)? {
            return Ok(CommitOutcome::NothingToCommit);
        }
        return Err(DeliveryError::Commit(out.detail()));
    }

    let head = git.metadata(working_copy, &["rev-parse", "HEAD"])?;
    let id = head.stdout.trim();
    if !head.success() || id.is_empty() {
        return Err(DeliveryError::Commit(format!("rev-parse HEAD: {}", head.detail())));
    }
    let id = CommitId::from(id);
    tracing::info!("committed {}: {message}", id.short());
    Ok(CommitOutcome::Committed(id))
}

/// Id and subject line of the commit at HEAD.
pub fn head_commit<R: CommandRunner + ?Sized>(
    git: &Git<'_, R>,
    working_copy: &Path,
) -> Result<(CommitId, String), DeliveryError> {
    let out = git.metadata(working_copy, &["log", "-1", "--format=%H%x1f%s"])?;
    if !out.success() {
        return Err(DeliveryError::Commit(format!("log -1: {}", out.detail())));
    }
    match out.stdout.trim_end().split_once('\x1f') {
        Some((id, subject)) if !id.is_empty() => {
            Ok((CommitId::from(id), subject.to_string()))
        }
        _ => Err(DeliveryError::Commit(format!(
            "log -1: unexpected output {:?}",
            out.stdout.trim()
        ))),
    }
}

/// `git push origin <branch>`.
///
/// On rejection the remote branch is fetched; if its tip is not contained in
/// local HEAD the remote has moved and the error is
/// [`DeliveryError::PushConflict`]. The local commit is kept either way.
pub fn push<R: CommandRunner + ?Sized>(
    git: &Git<'_, R>,
    working_copy: &Path,
    branch: &str,
) -> Result<(), DeliveryError> {
    let out = git.network(working_copy, &["push", "origin", branch])?;
    if out.success() {
        tracing::info!("pushed to origin/{branch}");
        return Ok(());
    }
    let detail = out.detail();

    let fetched = git.network(working_copy, &["fetch", "origin", branch])?;
    if fetched.success() {
        let upstream = format!("origin/{branch}");
        if git.is_ancestor(working_copy, &upstream, "HEAD")? == Some(false) {
            return Err(DeliveryError::PushConflict {
                branch: branch.to_string(),
            });
        }
    }
    Err(DeliveryError::Push(detail))
}

/// Commit then push. `Ok(None)` when there was nothing to commit.
pub fn commit_and_push<R: CommandRunner + ?Sized>(
    git: &Git<'_, R>,
    working_copy: &Path,
    template: &str,
    title: &str,
    branch: &str,
) -> Result<Option<CommitId>, DeliveryError> {
    match commit(git, working_copy, &format_message(template, title))? {
        CommitOutcome::NothingToCommit => Ok(None),
        CommitOutcome::Committed(id) => {
            push(git, working_copy, branch)?;
            Ok(Some(id))
        }
    }
}
