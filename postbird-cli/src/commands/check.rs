//! `postbird check` — configuration validation and git availability.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use postbird_core::Timeouts;
use postbird_delivery::{git_version, SystemRunner};

use super::{read_token, GlobalArgs};

/// Validate configuration and check that git is available.
#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let mut ok = true;

        match git_version(&SystemRunner::new(), Timeouts::default()) {
            Ok(Some(version)) => pass(&version),
            Ok(None) => {
                fail("git is installed but `git --version` failed");
                ok = false;
            }
            Err(e) => {
                fail(&format!("git is not available: {e}"));
                ok = false;
            }
        }

        let path = global.config_path()?;
        let cfg = match global.load_config() {
            Ok(cfg) => {
                pass(&format!("loaded {}", path.display()));
                cfg
            }
            Err(e) => {
                fail(&format!("{e:#}"));
                return Ok(ExitCode::FAILURE);
            }
        };

        let report = cfg.validate();
        for error in &report.errors {
            fail(error);
        }
        for warning in &report.warnings {
            println!("{} {warning}", "!".yellow().bold());
        }
        ok &= report.is_valid();

        if let Some(var) = cfg.auth.token_env.as_deref() {
            match cfg.resolve(read_token(&cfg).as_deref()) {
                Ok(_) => pass(&format!("token variable {var} is set")),
                Err(e) => {
                    fail(&e.to_string());
                    ok = false;
                }
            }
        }

        if ok {
            pass(&format!(
                "ready to deliver to {} ({})",
                cfg.target.redacted_url(),
                cfg.target.branch
            ));
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::FAILURE)
        }
    }
}

fn pass(message: &str) {
    println!("{} {message}", "✓".green().bold());
}

fn fail(message: &str) {
    println!("{} {message}", "✗".red().bold());
}
