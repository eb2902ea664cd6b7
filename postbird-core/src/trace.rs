//! Delivery trace and terminal result types.
//!
//! A [`Trace`] is append-only: steps can be pushed and read, never removed
//! or reordered. A [`DeliveryResult`] is built once per delivery invocation
//! and handed back to the caller; nothing here is persisted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::CommitId;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Stage names recorded in the trace, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepName {
    Sync,
    Identity,
    Stage,
    Commit,
    Push,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Sync => "sync",
            StepName::Identity => "identity",
            StepName::Stage => "stage",
            StepName::Commit => "commit",
            StepName::Push => "push",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    Success,
    Failure,
    Skipped,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Success => write!(f, "success"),
            StepOutcome::Failure => write!(f, "failure"),
            StepOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// One recorded stage transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStep {
    pub name: StepName,
    pub outcome: StepOutcome,
    pub detail: String,
}

/// Ordered, append-only log of stage outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace(Vec<DeliveryStep>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: StepName, outcome: StepOutcome, detail: impl Into<String>) {
        self.0.push(DeliveryStep {
            name,
            outcome,
            detail: detail.into(),
        });
    }

    pub fn steps(&self) -> &[DeliveryStep] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&DeliveryStep> {
        self.0.last()
    }

    /// Whether a step with `name` was recorded with outcome `outcome`.
    pub fn contains(&self, name: StepName, outcome: StepOutcome) -> bool {
        self.0.iter().any(|s| s.name == name && s.outcome == outcome)
    }
}

// ---------------------------------------------------------------------------
// State machine states
// ---------------------------------------------------------------------------

/// States of the delivery state machine.
///
/// `Failed` is absorbing and remembers which step produced the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeliveryState {
    Start,
    Synced,
    IdentityConfigured,
    Staged,
    NoChanges,
    Committed,
    Pushed,
    Failed { step: StepName, reason: String },
}

impl DeliveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeliveryState::NoChanges | DeliveryState::Pushed | DeliveryState::Failed { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// What the synchronizer had to do to make the working copy ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Cloned,
    Updated,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Cloned => write!(f, "cloned"),
            SyncAction::Updated => write!(f, "updated"),
        }
    }
}

/// Classification of the error that stopped a delivery.
///
/// `PushConflict` and `SyncConflict` mean the remote moved; a caller may
/// re-invoke the whole pipeline. The others need attention first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    InvalidTarget,
    Execution,
    Sync,
    SyncConflict,
    Identity,
    Stage,
    Commit,
    PushConflict,
    Push,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidTarget => "invalid-target",
            FailureKind::Execution => "execution",
            FailureKind::Sync => "sync",
            FailureKind::SyncConflict => "sync-conflict",
            FailureKind::Identity => "identity",
            FailureKind::Stage => "stage",
            FailureKind::Commit => "commit",
            FailureKind::PushConflict => "push-conflict",
            FailureKind::Push => "push",
        }
    }

    /// Whether resyncing and re-running the pipeline can succeed unaided.
    pub fn is_conflict(&self) -> bool {
        matches!(self, FailureKind::SyncConflict | FailureKind::PushConflict)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    Completed,
    Failed,
    NoChanges,
}

impl DeliveryStatus {
    /// `completed` and `no-changes` both count as success for exit codes.
    pub fn is_success(&self) -> bool {
        !matches!(self, DeliveryStatus::Failed)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Completed => write!(f, "completed"),
            DeliveryStatus::Failed => write!(f, "failed"),
            DeliveryStatus::NoChanges => write!(f, "no-changes"),
        }
    }
}

/// Terminal value of one delivery invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub status: DeliveryStatus,
    pub trace: Trace,
    /// Every fatal error collected, in the order it was raised.
    pub errors: Vec<String>,
    /// Non-fatal problems (e.g. an asset that could not be copied).
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<CommitId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_action: Option<SyncAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<StepName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_appends_in_order() {
        let mut trace = Trace::new();
        trace.push(StepName::Sync, StepOutcome::Success, "cloned");
        trace.push(StepName::Identity, StepOutcome::Success, "");
        trace.push(StepName::Stage, StepOutcome::Failure, "boom");

        let names: Vec<_> = trace.steps().iter().map(|s| s.name).collect();
        assert_eq!(names, vec![StepName::Sync, StepName::Identity, StepName::Stage]);
        assert_eq!(trace.last().map(|s| s.outcome), Some(StepOutcome::Failure));
        assert!(trace.contains(StepName::Sync, StepOutcome::Success));
        assert!(!trace.contains(StepName::Push, StepOutcome::Success));
    }

    #[test]
    fn status_serializes_kebab_case() {
        let scalar = yaml_scalar(&DeliveryStatus::NoChanges);
        assert_eq!(scalar, "no-changes");
        assert_eq!(DeliveryStatus::NoChanges.to_string(), "no-changes");
    }

    #[test]
    fn success_statuses() {
        assert!(DeliveryStatus::Completed.is_success());
        assert!(DeliveryStatus::NoChanges.is_success());
        assert!(!DeliveryStatus::Failed.is_success());
    }

    #[test]
    fn failure_kind_display_matches_serde() {
        for kind in [FailureKind::InvalidTarget, FailureKind::PushConflict, FailureKind::Execution] {
            assert_eq!(
                serde_yaml::to_string(&kind).unwrap().trim(),
                kind.to_string()
            );
        }
    }

    #[test]
    fn conflict_kinds() {
        assert!(FailureKind::PushConflict.is_conflict());
        assert!(FailureKind::SyncConflict.is_conflict());
        assert!(!FailureKind::Push.is_conflict());
    }

    #[test]
    fn terminal_states() {
        assert!(DeliveryState::NoChanges.is_terminal());
        assert!(DeliveryState::Pushed.is_terminal());
        assert!(DeliveryState::Failed {
            step: StepName::Push,
            reason: "rejected".into()
        }
        .is_terminal());
        assert!(!DeliveryState::Staged.is_terminal());
    }

    fn yaml_scalar(status: &DeliveryStatus) -> String {
        serde_yaml::to_string(status)
            .expect("serialize")
            .trim()
            .to_string()
    }
}
