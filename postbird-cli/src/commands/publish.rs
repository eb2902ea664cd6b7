//! `postbird publish` — render an artifact and deliver it.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use super::render::render_to;
use super::{deliver_and_report, GlobalArgs};

/// Render an artifact and deliver the result in one go.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// YAML artifact description.
    pub artifact: PathBuf,

    /// Companion file copied into the asset directory.
    #[arg(long)]
    pub asset: Option<PathBuf>,

    /// Where the rendered document is written before delivery
    /// (default: <tmp>/postbird).
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Directory with a `post.md.tera` that replaces the built-in template.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Print the delivery result as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PublishArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        // Fail on config problems before rendering anything.
        let config = global.resolved_config()?;

        let out = self
            .out
            .unwrap_or_else(|| std::env::temp_dir().join("postbird"));
        let (document, title) = render_to(&self.artifact, &out, self.templates.as_deref())?;
        tracing::info!("rendered {}", document.display());

        deliver_and_report(
            &config,
            &document,
            self.asset.as_deref(),
            title,
            self.json,
            global.verbose,
        )
    }
}
