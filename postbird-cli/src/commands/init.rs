//! `postbird init` — write a starter configuration file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Args;

use postbird_core::{config, DeliveryConfig};

use super::GlobalArgs;

/// Write a starter configuration file.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Remote repository URL (https or ssh).
    #[arg(long)]
    pub url: Option<String>,

    /// Branch to deliver to.
    #[arg(long, short = 'b')]
    pub branch: Option<String>,

    /// Where the local working copy lives.
    #[arg(long, value_name = "DIR")]
    pub local_path: Option<PathBuf>,

    /// Name of an environment variable holding an HTTPS access token.
    #[arg(long, value_name = "VAR")]
    pub token_env: Option<String>,

    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let path = global.config_path()?;
        if path.exists() && !self.force {
            bail!(
                "{} already exists; pass --force to overwrite",
                path.display()
            );
        }

        let mut cfg = DeliveryConfig::default();
        if let Some(url) = self.url {
            cfg.target.url = url;
        }
        if let Some(branch) = self.branch {
            cfg.target.branch = branch;
        }
        if let Some(local_path) = self.local_path {
            cfg.target.local_path = local_path;
        }
        cfg.auth.token_env = self.token_env;

        config::save_at(&path, &cfg)
            .with_context(|| format!("failed to write {}", path.display()))?;

        println!("✓ Wrote {}", path.display());
        if cfg.target.url.is_empty() {
            println!("  Set target.url before running `postbird deliver`.");
        }
        Ok(ExitCode::SUCCESS)
    }
}
