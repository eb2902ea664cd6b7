//! Postbird core library — domain types, delivery configuration, errors.
//!
//! - [`types`] — repository target, identity, artifact, rendered outputs
//! - [`trace`] — delivery steps, trace, terminal result
//! - [`config`] — YAML configuration: load / save / resolve / validate
//! - [`producer`] — [`ArtifactProducer`] seam for content generation
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod producer;
pub mod trace;
pub mod types;

pub use config::{DeliveryConfig, ResolvedConfig, Timeouts};
pub use error::ConfigError;
pub use producer::ArtifactProducer;
pub use trace::{
    DeliveryResult, DeliveryState, DeliveryStatus, DeliveryStep, FailureKind, StepName, StepOutcome,
    SyncAction, Trace,
};
pub use types::{
    redact_url, Artifact, ArtifactMetadata, CommitId, Identity, RenderedFile, RepositoryTarget,
};
