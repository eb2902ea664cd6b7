//! Postbird — publish rendered blog posts into a git-hosted static site.
//!
//! # Usage
//!
//! ```text
//! postbird init [--url <url>] [--branch <b>] [--local-path <dir>] [--token-env <VAR>] [--force]
//! postbird render <artifact.yaml> [--out <dir>] [--templates <dir>]
//! postbird deliver <document.md> [--asset <file>] [--title <t>] [--json]
//! postbird publish <artifact.yaml> [--asset <file>] [--out <dir>] [--json]
//! postbird status [--json]
//! postbird check
//! ```
//!
//! Global flags: `--config <path>` (default `~/.postbird/config.yaml`),
//! `-v/--verbose` (debug logging and the full delivery trace).

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{
    check::CheckArgs, deliver::DeliverArgs, init::InitArgs, publish::PublishArgs,
    render::RenderArgs, status::StatusArgs, GlobalArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "postbird",
    version,
    about = "Render blog posts and deliver them to a git-hosted site",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter configuration file.
    Init(InitArgs),

    /// Render an artifact description into a front-matter markdown file.
    Render(RenderArgs),

    /// Commit and push an already-rendered document.
    Deliver(DeliverArgs),

    /// Render an artifact and deliver the result in one go.
    Publish(PublishArgs),

    /// Show the state of the local working copy.
    Status(StatusArgs),

    /// Validate configuration and check that git is available.
    Check(CheckArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let global = cli.global;
    match cli.command {
        Commands::Init(args) => args.run(&global),
        Commands::Render(args) => args.run(&global),
        Commands::Deliver(args) => args.run(&global),
        Commands::Publish(args) => args.run(&global),
        Commands::Status(args) => args.run(&global),
        Commands::Check(args) => args.run(&global),
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `info`, or `debug` with `-v`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
