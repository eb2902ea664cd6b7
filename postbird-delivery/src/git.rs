//! Thin git front-end over a [`CommandRunner`].
//!
//! Every invocation is bounded: local metadata commands use the short
//! timeout, anything that talks to the remote uses the long one.

use std::path::Path;

use postbird_core::Timeouts;

use crate::error::ExecutionError;
use crate::runner::{CommandOutput, CommandRunner};

pub(crate) const GIT: &str = "git";

/// Borrowed runner plus the timeouts to apply.
pub struct Git<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    timeouts: Timeouts,
}

impl<'a, R: CommandRunner + ?Sized> Git<'a, R> {
    pub fn new(runner: &'a R, timeouts: Timeouts) -> Self {
        Self { runner, timeouts }
    }

    /// Local command (config, add, status, commit, rev-parse, ...).
    pub fn metadata(&self, cwd: &Path, args: &[&str]) -> Result<CommandOutput, ExecutionError> {
        self.runner.run(GIT, args, cwd, self.timeouts.metadata())
    }

    /// Remote command (clone, fetch, push).
    pub fn network(&self, cwd: &Path, args: &[&str]) -> Result<CommandOutput, ExecutionError> {
        self.runner.run(GIT, args, cwd, self.timeouts.network())
    }

    /// `git merge-base --is-ancestor <ancestor> <descendant>`.
    ///
    /// `Some(true)` / `Some(false)` for exit codes 0 / 1. Any other exit code
    /// (unknown revision, corrupt repository) yields `None`.
    pub fn is_ancestor(
        &self,
        cwd: &Path,
        ancestor: &str,
        descendant: &str,
    ) -> Result<Option<bool>, ExecutionError> {
        let out = self.metadata(cwd, &["merge-base", "--is-ancestor", ancestor, descendant])?;
        Ok(match out.exit_code {
            0 => Some(true),
            1 => Some(false),
            _ => None,
        })
    }
}
