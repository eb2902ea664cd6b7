//! `postbird status` — working copy visibility.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use postbird_delivery::{repository_status, RepositoryStatus, SystemRunner};

use super::GlobalArgs;

/// Show the state of the local working copy.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    remote: String,
    #[serde(flatten)]
    repository: &'a RepositoryStatus,
}

impl StatusArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let cfg = global.load_config()?;
        let status = repository_status(&SystemRunner::new(), cfg.timeouts, &cfg.target)
            .context("failed to inspect working copy")?;

        if self.json {
            let payload = StatusJson {
                remote: cfg.target.redacted_url(),
                repository: &status,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(ExitCode::SUCCESS);
        }

        println!("Postbird v{} | {}", env!("CARGO_PKG_VERSION"), cfg.target.redacted_url());
        match status {
            RepositoryStatus::NotInitialized { path } => {
                println!(
                    "{} no working copy at {} (created on first delivery)",
                    "■".bright_black().bold(),
                    path.display()
                );
            }
            RepositoryStatus::Ready {
                path,
                branch,
                last_commit,
                has_uncommitted_changes,
            } => {
                let indicator = if has_uncommitted_changes {
                    "■".yellow().bold()
                } else {
                    "■".green().bold()
                };
                println!("{indicator} {} on {}", path.display(), branch.bold());
                match last_commit {
                    Some(c) => {
                        let short: String = c.hash.chars().take(7).collect();
                        println!("  last commit: {short} {}", c.message);
                        println!("  author:      {} <{}>", c.author, c.email);
                        println!("  date:        {} ({})", c.date, format_age(&c.date));
                    }
                    None => println!("  no commits yet"),
                }
                if has_uncommitted_changes {
                    println!("  {}", "uncommitted changes present".yellow());
                }
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}

/// "3h ago"-style age for an RFC 3339 timestamp; the input when unparsable.
fn format_age(rfc3339: &str) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(rfc3339) else {
        return rfc3339.to_string();
    };
    let secs = (Utc::now() - then.with_timezone(&Utc)).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
