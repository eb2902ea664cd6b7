//! Delivery state machine: the single entrypoint used by the CLI.
//!
//! ```text
//! Start ─sync─▶ Synced ─identity─▶ IdentityConfigured ─stage─▶ Staged
//!   Staged ─commit(skipped)─▶ NoChanges
//!   Staged ─commit─▶ Committed ─push─▶ Pushed
//!   Staged ─commit(skipped, HEAD ahead)─▶ Committed
//! any step ─failure─▶ Failed(step, reason)
//! ```
//!
//! Each transition appends exactly one step to the trace. This module is the
//! only place where component errors become trace entries.
//!
//! A clean tree whose HEAD is ahead of `origin/<branch>` means an earlier
//! delivery committed but failed to push; that commit is pushed as is.

use std::path::PathBuf;

use chrono::Utc;

use postbird_core::{
    CommitId, DeliveryResult, DeliveryState, DeliveryStatus, FailureKind, ResolvedConfig,
    StepName, StepOutcome, SyncAction, Trace,
};

use crate::changes::{has_pending_changes, unpushed_commits};
use crate::commit::{self, format_message, CommitOutcome};
use crate::error::DeliveryError;
use crate::git::Git;
use crate::identity::apply_identity;
use crate::runner::{CommandRunner, SystemRunner};
use crate::stager;
use crate::sync;

/// What to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// Rendered document on local disk.
    pub document: PathBuf,
    /// Optional companion file (e.g. an image).
    pub asset: Option<PathBuf>,
    /// Substituted for `{title}` in the commit message template.
    pub title: String,
}

/// Runs deliveries with a given command runner.
#[derive(Debug, Clone, Default)]
pub struct Pipeline<R: CommandRunner = SystemRunner> {
    runner: R,
}

impl Pipeline<SystemRunner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run one delivery from `Start` to a terminal state.
    ///
    /// Never returns an error: every failure is folded into the returned
    /// [`DeliveryResult`].
    pub fn deliver(&self, config: &ResolvedConfig, request: &DeliveryRequest) -> DeliveryResult {
        let target = &config.target;
        let wc = target.local_path.as_path();
        let git = Git::new(&self.runner, config.timeouts);
        let mut run = Run::start();

        tracing::info!(
            "delivering {} to {} ({})",
            request.document.display(),
            target.redacted_url(),
            target.branch
        );

        // Start → Synced
        let missing = target.missing_fields();
        if !missing.is_empty() {
            return run.fail(StepName::Sync, DeliveryError::InvalidTarget { missing });
        }
        match sync::ensure_ready(&git, target) {
            Ok(action) => {
                run.sync_action = Some(action);
                let detail = match action {
                    SyncAction::Cloned => format!("cloned {}", target.redacted_url()),
                    SyncAction::Updated => format!("updated from origin/{}", target.branch),
                };
                run.advance(StepName::Sync, DeliveryState::Synced, detail);
            }
            Err(e) => return run.fail(StepName::Sync, e),
        }

        // Synced → IdentityConfigured
        if let Err(e) = apply_identity(&git, wc, &config.identity) {
            return run.fail(StepName::Identity, e);
        }
        run.advance(
            StepName::Identity,
            DeliveryState::IdentityConfigured,
            config.identity.to_string(),
        );

        // IdentityConfigured → Staged
        match stager::stage(
            &git,
            wc,
            &target.content_dir(),
            &target.asset_dir(),
            &request.document,
            request.asset.as_deref(),
        ) {
            Ok(report) => {
                run.warnings.extend(report.warnings.iter().cloned());
                run.advance(StepName::Stage, DeliveryState::Staged, report.summary());
            }
            Err(e) => return run.fail(StepName::Stage, e),
        }

        // Staged → NoChanges | Committed
        let pending = match has_pending_changes(&git, wc) {
            Ok(pending) => pending,
            Err(e) => return run.fail(StepName::Commit, e),
        };
        if !pending {
            let ahead = match unpushed_commits(&git, wc, &target.branch) {
                Ok(n) => n,
                Err(e) => return run.fail(StepName::Commit, e),
            };
            if ahead == 0 {
                run.skip(StepName::Commit, DeliveryState::NoChanges, "nothing to commit");
                return run.finish();
            }
            let (id, subject) = match commit::head_commit(&git, wc) {
                Ok(head) => head,
                Err(e) => return run.fail(StepName::Commit, e),
            };
            let detail = format!(
                "nothing new to commit; HEAD {} \"{subject}\" is {ahead} commit(s) ahead of origin/{}",
                id.short(),
                target.branch
            );
            tracing::info!("{detail}");
            run.commit_id = Some(id);
            run.commit_message = Some(subject);
            run.skip(StepName::Commit, DeliveryState::Committed, detail);
            return self.push(run, &git, config);
        }

        let message = format_message(&config.commit_message_template, &request.title);
        match commit::commit(&git, wc, &message) {
            Ok(CommitOutcome::Committed(id)) => {
                let detail = format!("{} {message}", id.short());
                run.commit_id = Some(id);
                run.commit_message = Some(message);
                run.advance(StepName::Commit, DeliveryState::Committed, detail);
            }
            Ok(CommitOutcome::NothingToCommit) => {
                run.skip(StepName::Commit, DeliveryState::NoChanges, "nothing to commit");
                return run.finish();
            }
            Err(e) => return run.fail(StepName::Commit, e),
        }

        self.push(run, &git, config)
    }

    /// Committed → Pushed
    fn push(&self, mut run: Run, git: &Git<'_, R>, config: &ResolvedConfig) -> DeliveryResult {
        let target = &config.target;
        if let Err(e) = commit::push(git, &target.local_path, &target.branch) {
            return run.fail(StepName::Push, e);
        }
        run.advance(
            StepName::Push,
            DeliveryState::Pushed,
            format!("origin/{}", target.branch),
        );
        run.finish()
    }
}

// ---------------------------------------------------------------------------
// Run bookkeeping
// ---------------------------------------------------------------------------

struct Run {
    state: DeliveryState,
    trace: Trace,
    errors: Vec<String>,
    warnings: Vec<String>,
    commit_id: Option<CommitId>,
    commit_message: Option<String>,
    sync_action: Option<SyncAction>,
    failure_kind: Option<FailureKind>,
    started_at: chrono::DateTime<Utc>,
}

impl Run {
    fn start() -> Self {
        Self {
            state: DeliveryState::Start,
            trace: Trace::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            commit_id: None,
            commit_message: None,
            sync_action: None,
            failure_kind: None,
            started_at: Utc::now(),
        }
    }

    fn advance(&mut self, step: StepName, to: DeliveryState, detail: impl Into<String>) {
        self.transition(step, StepOutcome::Success, to, detail.into());
    }

    fn skip(&mut self, step: StepName, to: DeliveryState, detail: impl Into<String>) {
        self.transition(step, StepOutcome::Skipped, to, detail.into());
    }

    fn transition(&mut self, step: StepName, outcome: StepOutcome, to: DeliveryState, detail: String) {
        tracing::debug!("{step}: {outcome} ({:?} -> {:?})", self.state, to);
        self.trace.push(step, outcome, detail);
        self.state = to;
    }

    /// Record `err` as the reason for stopping at `step` and finish.
    fn fail(mut self, step: StepName, err: DeliveryError) -> DeliveryResult {
        let reason = err.to_string();
        tracing::error!("{step} failed: {reason}");
        self.failure_kind = Some(err.kind());
        self.errors.push(reason.clone());
        let detail = format!("failed at {step}: {}", self.errors.join("; "));
        self.transition(
            step,
            StepOutcome::Failure,
            DeliveryState::Failed { step, reason },
            detail,
        );
        self.finish()
    }

    fn finish(self) -> DeliveryResult {
        if !self.state.is_terminal() {
            tracing::warn!("delivery stopped in non-terminal state {:?}", self.state);
        }
        let (status, failed_step) = match &self.state {
            DeliveryState::Pushed => (DeliveryStatus::Completed, None),
            DeliveryState::NoChanges => (DeliveryStatus::NoChanges, None),
            DeliveryState::Failed { step, .. } => (DeliveryStatus::Failed, Some(*step)),
            _ => (DeliveryStatus::Failed, self.trace.last().map(|s| s.name)),
        };
        tracing::info!("delivery {status} after {} step(s)", self.trace.len());
        DeliveryResult {
            status,
            trace: self.trace,
            errors: self.errors,
            warnings: self.warnings,
            commit_id: self.commit_id,
            commit_message: self.commit_message,
            sync_action: self.sync_action,
            failed_step,
            failure_kind: self.failure_kind,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
