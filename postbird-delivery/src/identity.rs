//! Repository-local committer identity.

use std::path::Path;

use postbird_core::Identity;

use crate::error::DeliveryError;
use crate::git::Git;
use crate::runner::CommandRunner;

/// Set `user.name` and `user.email` in the working copy's own config.
/// Re-applying the same identity is a no-op for git.
pub fn apply_identity<R: CommandRunner + ?Sized>(
    git: &Git<'_, R>,
    working_copy: &Path,
    identity: &Identity,
) -> Result<(), DeliveryError> {
    for (key, value) in [("user.name", &identity.name), ("user.email", &identity.email)] {
        let out = git.metadata(working_copy, &["config", key, value])?;
        if !out.success() {
            return Err(DeliveryError::Identity(format!("{key}: {}", out.detail())));
        }
    }
    tracing::debug!("identity set to {identity}");
    Ok(())
}
