//! `postbird deliver` — commit and push an already-rendered document.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use postbird_renderer::{front_matter_title, validate_document};

use super::{deliver_and_report, GlobalArgs};

/// Title used when neither `--title` nor the document provides one.
const FALLBACK_TITLE: &str = "New blog post";

/// Commit and push an already-rendered document.
#[derive(Args, Debug)]
pub struct DeliverArgs {
    /// Rendered markdown document with a front-matter block.
    pub document: PathBuf,

    /// Companion file copied into the asset directory.
    #[arg(long)]
    pub asset: Option<PathBuf>,

    /// Commit title (default: the document's front-matter title).
    #[arg(long)]
    pub title: Option<String>,

    /// Print the delivery result as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DeliverArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let content = std::fs::read_to_string(&self.document)
            .with_context(|| format!("cannot read {}", self.document.display()))?;

        let report = validate_document(&content);
        for warning in &report.warnings {
            eprintln!("{} {warning}", "warning:".yellow().bold());
        }
        if !report.is_valid() {
            eprintln!(
                "{} {} is not deliverable:",
                "✗".red().bold(),
                self.document.display()
            );
            for error in &report.errors {
                eprintln!("  {error}");
            }
            return Ok(ExitCode::FAILURE);
        }

        let title = self
            .title
            .or_else(|| front_matter_title(&content))
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let config = global.resolved_config()?;

        deliver_and_report(
            &config,
            &self.document,
            self.asset.as_deref(),
            title,
            self.json,
            global.verbose,
        )
    }
}
