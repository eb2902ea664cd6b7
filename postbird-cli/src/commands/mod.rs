//! Subcommands plus the helpers they share: config loading, token lookup,
//! and delivery result printing.

pub mod check;
pub mod deliver;
pub mod init;
pub mod publish;
pub mod render;
pub mod status;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use postbird_core::{
    config, DeliveryConfig, DeliveryResult, DeliveryStatus, ResolvedConfig, StepOutcome,
};
use postbird_delivery::{DeliveryRequest, Pipeline};

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (default: ~/.postbird/config.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging and the full delivery trace.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config::default_path().context("could not locate default config path"),
        }
    }

    pub fn load_config(&self) -> Result<DeliveryConfig> {
        let path = self.config_path()?;
        if !path.exists() {
            bail!(
                "no configuration at {}; run `postbird init` first",
                path.display()
            );
        }
        config::load_at(&path).with_context(|| format!("failed to load {}", path.display()))
    }

    /// Load, validate, and resolve the configuration, reading the auth token
    /// from the environment if one is configured.
    pub fn resolved_config(&self) -> Result<ResolvedConfig> {
        let cfg = self.load_config()?;
        let report = cfg.validate();
        for warning in &report.warnings {
            eprintln!("{} {warning}", "warning:".yellow().bold());
        }
        if !report.is_valid() {
            bail!("invalid configuration: {}", report.errors.join("; "));
        }
        let token = read_token(&cfg);
        cfg.resolve(token.as_deref())
            .context("failed to resolve configuration")
    }
}

/// Value of the variable named by `auth.token_env`, if set and non-empty.
pub(crate) fn read_token(cfg: &DeliveryConfig) -> Option<String> {
    let var = cfg.auth.token_env.as_deref()?;
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// Run one delivery, print the outcome, and map it to an exit code.
pub(crate) fn deliver_and_report(
    config: &ResolvedConfig,
    document: &Path,
    asset: Option<&Path>,
    title: String,
    json: bool,
    verbose: bool,
) -> Result<ExitCode> {
    let request = DeliveryRequest {
        document: document.to_path_buf(),
        asset: asset.map(Path::to_path_buf),
        title,
    };
    let result = Pipeline::new().deliver(config, &request);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to serialize result JSON")?
        );
    } else {
        print_result(&result, verbose);
    }
    Ok(exit_code(&result))
}

pub(crate) fn exit_code(result: &DeliveryResult) -> ExitCode {
    if result.status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[derive(Tabled)]
struct TraceRow {
    #[tabled(rename = "step")]
    step: String,
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_result(result: &DeliveryResult, verbose: bool) {
    let elapsed = (result.finished_at - result.started_at).num_milliseconds();
    match result.status {
        DeliveryStatus::Completed => {
            let id = result.commit_id.as_ref().map(|c| c.short()).unwrap_or("-");
            let message = result.commit_message.as_deref().unwrap_or("");
            println!(
                "{} delivered {} \"{message}\" ({elapsed} ms)",
                "✓".green().bold(),
                id.bold()
            );
        }
        DeliveryStatus::NoChanges => {
            println!("{} no changes, nothing to deliver", "·".bright_black().bold());
        }
        DeliveryStatus::Failed => {
            let step = result
                .failed_step
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown step".to_string());
            match result.failure_kind {
                Some(kind) => println!("{} failed at {step} ({kind})", "✗".red().bold()),
                None => println!("{} failed at {step}", "✗".red().bold()),
            }
            for error in &result.errors {
                println!("  {error}");
            }
            if result.failure_kind.is_some_and(|k| k.is_conflict()) {
                println!("  The remote moved; re-run the delivery to retry.");
            }
        }
    }

    for warning in &result.warnings {
        println!("  {} {warning}", "warning:".yellow().bold());
    }

    if verbose {
        let rows: Vec<TraceRow> = result
            .trace
            .steps()
            .iter()
            .map(|s| TraceRow {
                step: s.name.to_string(),
                outcome: outcome_label(s.outcome),
                detail: s.detail.clone(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}

fn outcome_label(outcome: StepOutcome) -> String {
    match outcome {
        StepOutcome::Success => "success".green().to_string(),
        StepOutcome::Failure => "failure".red().to_string(),
        StepOutcome::Skipped => "skipped".bright_black().to_string(),
    }
}
