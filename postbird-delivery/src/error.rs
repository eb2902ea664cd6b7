//! Error types for postbird-delivery.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use postbird_core::FailureKind;

/// The external tool could not be run to completion at all.
///
/// A non-zero exit code is *not* an `ExecutionError`; it is an ordinary
/// [`CommandOutput`](crate::runner::CommandOutput) the caller inspects.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The executable is missing or could not be spawned.
    #[error("could not start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process outlived its timeout and was killed.
    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    Timeout {
        command: String,
        timeout: Duration,
        /// Output captured before the process was killed.
        stdout: String,
        stderr: String,
    },

    /// Waiting on the child failed after it was spawned.
    #[error("lost track of `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// All errors that can stop a delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("repository target is missing required field(s): {}", .missing.join(", "))]
    InvalidTarget { missing: Vec<&'static str> },

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Fetch, merge, or clone failed (network, auth, unknown branch, …).
    #[error("sync failed: {0}")]
    Sync(String),

    /// Disk or permission failure while preparing the working copy.
    #[error("sync failed at {path}: {source}")]
    SyncIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Local history has diverged from the remote branch.
    #[error("working copy has diverged from origin/{branch}; not a fast-forward")]
    SyncConflict { branch: String },

    #[error("could not configure committer identity: {0}")]
    Identity(String),

    #[error("document not found: {path}")]
    MissingDocument { path: PathBuf },

    #[error("could not stage {path}: {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `git add` itself failed.
    #[error("could not mark files for commit: {0}")]
    Add(String),

    #[error("commit failed: {0}")]
    Commit(String),

    /// The remote branch advanced past the local base since sync.
    #[error("push rejected: origin/{branch} has advanced since sync")]
    PushConflict { branch: String },

    #[error("push failed: {0}")]
    Push(String),
}

impl DeliveryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DeliveryError::InvalidTarget { .. } => FailureKind::InvalidTarget,
            DeliveryError::Execution(_) => FailureKind::Execution,
            DeliveryError::Sync(_) | DeliveryError::SyncIo { .. } => FailureKind::Sync,
            DeliveryError::SyncConflict { .. } => FailureKind::SyncConflict,
            DeliveryError::Identity(_) => FailureKind::Identity,
            DeliveryError::MissingDocument { .. }
            | DeliveryError::Stage { .. }
            | DeliveryError::Add(_) => FailureKind::Stage,
            DeliveryError::Commit(_) => FailureKind::Commit,
            DeliveryError::PushConflict { .. } => FailureKind::PushConflict,
            DeliveryError::Push(_) => FailureKind::Push,
        }
    }
}

pub(crate) fn sync_io(path: impl Into<PathBuf>, source: std::io::Error) -> DeliveryError {
    DeliveryError::SyncIo {
        path: path.into(),
        source,
    }
}

pub(crate) fn stage_io(path: impl Into<PathBuf>, source: std::io::Error) -> DeliveryError {
    DeliveryError::Stage {
        path: path.into(),
        source,
    }
}
