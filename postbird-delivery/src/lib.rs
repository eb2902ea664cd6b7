//! # postbird-delivery
//!
//! Git-backed delivery of rendered posts into a static-site repository.
//!
//! Call [`Pipeline::deliver`] with a [`ResolvedConfig`](postbird_core::ResolvedConfig)
//! and a [`DeliveryRequest`]; every outcome, including failure, comes back as
//! a [`DeliveryResult`](postbird_core::DeliveryResult). The component
//! functions ([`sync::ensure_ready`], [`stager::stage`], [`commit::commit`],
//! ...) are public for callers that need a single step.

pub mod changes;
pub mod commit;
pub mod error;
pub mod git;
pub mod identity;
pub mod pipeline;
pub mod runner;
pub mod stager;
pub mod status;
pub mod sync;

pub use error::{DeliveryError, ExecutionError};
pub use git::Git;
pub use pipeline::{DeliveryRequest, Pipeline};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use stager::{StageReport, WriteResult};
pub use status::{git_version, repository_status, LastCommit, RepositoryStatus};
