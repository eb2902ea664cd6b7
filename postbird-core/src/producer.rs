//! Content-generation seam.
//!
//! The delivery core never generates content. Whatever produces an
//! [`Artifact`] (templated summaries, a model call, a file on disk) sits
//! behind this trait and can be swapped without touching delivery.

use crate::types::Artifact;

/// Turns caller-specific source data into an immutable [`Artifact`].
pub trait ArtifactProducer {
    /// Input the producer consumes.
    type Source: ?Sized;
    type Error: std::error::Error + Send + Sync + 'static;

    fn produce(&self, source: &Self::Source) -> Result<Artifact, Self::Error>;
}
