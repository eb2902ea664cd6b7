//! `postbird render` — artifact YAML to `<out>/<slug>.md`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use postbird_core::ArtifactProducer;
use postbird_renderer::{write_rendered, Renderer, YamlArtifactSource};

use super::GlobalArgs;

/// Render an artifact description into a front-matter markdown file.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// YAML artifact description (title, body, date, tags, metadata).
    pub artifact: PathBuf,

    /// Output directory.
    #[arg(long, short = 'o', default_value = ".")]
    pub out: PathBuf,

    /// Directory with a `post.md.tera` that replaces the built-in template.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

impl RenderArgs {
    pub fn run(self, _global: &GlobalArgs) -> Result<ExitCode> {
        let (path, _) = render_to(&self.artifact, &self.out, self.templates.as_deref())?;
        println!("✓ Rendered {}", path.display());
        Ok(ExitCode::SUCCESS)
    }
}

/// Produce, render, and write one artifact. Returns the written path and the
/// artifact title.
pub(crate) fn render_to(
    artifact: &Path,
    out: &Path,
    templates: Option<&Path>,
) -> Result<(PathBuf, String)> {
    let artifact = YamlArtifactSource
        .produce(artifact)
        .with_context(|| format!("failed to read artifact {}", artifact.display()))?;
    let renderer = Renderer::with_template_dir(templates).context("failed to load template")?;
    let file = renderer
        .render(&artifact)
        .with_context(|| format!("failed to render '{}'", artifact.title))?;
    let path = write_rendered(out, &file)
        .with_context(|| format!("failed to write into {}", out.display()))?;
    Ok((path, artifact.title))
}
