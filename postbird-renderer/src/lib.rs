//! # postbird-renderer
//!
//! Tera-based formatter that turns an [`Artifact`](postbird_core::Artifact)
//! into a front-matter markdown document, plus the checks that gate a
//! document before delivery.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use postbird_core::ArtifactProducer;
//! use postbird_renderer::{write_rendered, Renderer, YamlArtifactSource};
//!
//! fn render_one(source: &Path, out: &Path) -> Result<(), postbird_renderer::RenderError> {
//!     let artifact = YamlArtifactSource.produce(source)?;
//!     let file = Renderer::new()?.render(&artifact)?;
//!     write_rendered(out, &file)?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod source;
pub mod validate;

pub use context::FrontMatterContext;
pub use engine::{slug, write_rendered, Renderer};
pub use error::RenderError;
pub use source::YamlArtifactSource;
pub use validate::{front_matter_title, validate_document, ValidationReport};
