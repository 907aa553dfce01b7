//! `pr-decorator` CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Wire observability**: configure `tracing-subscriber` with a human or
//!    JSON layer and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an
//!    OpenTelemetry OTLP exporter. Every span and event emitted by the
//!    workspace crates flows through it.
//! 2. **Load inputs**: provider configuration (TOML), branch registry,
//!    analysis result and descriptor (JSON).
//! 3. **Run a subcommand**:
//!    - `resolve` turns `--param key=value` scan parameters into a branch
//!      descriptor printed as JSON.
//!    - `load` turns a resolved descriptor back into the analysed branch the
//!      report processing works with, printed as JSON.
//!    - `decorate` runs a decoration pass against Bitbucket Cloud and prints
//!      the decoration report as JSON.
//!
//! ## Exit status
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success. Decoration failures are listed in the report, not here. |
//! | 1 | I/O or input parsing failure |
//! | 2 | Branch resolution or loading failed |
//! | 3 | Invalid provider configuration |

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pipeline::{
    AnalysisResult, BranchDescriptor, BranchUuid, ConfigurationError, HostVersion,
    KnownBranches, LoadError, ResolutionError,
};
use tracing::error;

mod commands;
mod config;
mod telemetry;

#[derive(Parser)]
#[command(name = "pr-decorator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve analysis branches and decorate pull requests", long_about = None)]
struct Cli {
    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the branch descriptor for an analysis run
    Resolve {
        /// Branch registry (JSON)
        #[arg(long)]
        registry: PathBuf,

        /// Scan parameter as KEY=VALUE (repeatable)
        #[arg(long = "param", value_parser = commands::parse_param)]
        params: Vec<(String, String)>,

        /// Version of the analysis host, MAJOR.MINOR
        #[arg(long, default_value = "8.1")]
        host_version: HostVersion,

        /// Long-lived branch pattern; overrides branch.longLivedBranches.regex
        #[arg(long)]
        long_lived_pattern: Option<String>,
    },

    /// Load the analysed branch for a resolved descriptor
    Load {
        /// Branch registry (JSON)
        #[arg(long)]
        registry: PathBuf,

        /// Branch descriptor produced by `resolve` (JSON)
        #[arg(long)]
        descriptor: PathBuf,

        /// Project uuid, which is also the uuid of the main branch record
        #[arg(long, value_parser = parse_uuid)]
        project_uuid: BranchUuid,
    },

    /// Decorate a pull request with the results of an analysis
    Decorate {
        /// Provider configuration (TOML)
        #[arg(long)]
        config: PathBuf,

        /// Analysis result (JSON)
        #[arg(long)]
        analysis: PathBuf,

        /// Branch descriptor produced by `resolve` (JSON)
        #[arg(long)]
        descriptor: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match telemetry::init(cli.log_json, &cli.log_level) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    };

    telemetry.shutdown();
    code
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Resolve {
            registry,
            params,
            host_version,
            long_lived_pattern,
        } => {
            let registry: KnownBranches = config::load_json(&registry, "branch registry")?;
            let descriptor = commands::resolve_descriptor(
                &params,
                &registry,
                host_version,
                long_lived_pattern.as_deref(),
            )?;
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Commands::Load {
            registry,
            descriptor,
            project_uuid,
        } => {
            let registry: KnownBranches = config::load_json(&registry, "branch registry")?;
            let descriptor: BranchDescriptor = config::load_json(&descriptor, "descriptor")?;
            let branch = commands::load_branch(&descriptor, &registry, &project_uuid)?;
            println!("{}", serde_json::to_string_pretty(&branch)?);
        }
        Commands::Decorate {
            config: config_path,
            analysis,
            descriptor,
        } => {
            let provider_config = config::load_provider_config(&config_path)?;
            let analysis: AnalysisResult = config::load_json(&analysis, "analysis")?;
            let descriptor: BranchDescriptor = config::load_json(&descriptor, "descriptor")?;

            let report = commands::decorate(&provider_config, &analysis, &descriptor).await?;
            for failure in report.failures() {
                for provider_error in &failure.errors {
                    error!(step = ?failure.step, %provider_error, "Decoration step failed");
                }
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn parse_uuid(raw: &str) -> Result<BranchUuid, String> {
    BranchUuid::new(raw.trim()).ok_or_else(|| "project uuid must not be empty".to_string())
}

fn report_error(err: &anyhow::Error) -> ExitCode {
    if let Some(resolution) = err.downcast_ref::<ResolutionError>() {
        error!(error = %resolution, "Branch resolution failed");
        eprintln!("error: {}", resolution.user_message());
        if let Some(detail) = resolution.detail() {
            eprintln!("  caused by: {detail}");
        }
        return ExitCode::from(2);
    }

    if let Some(load) = err.downcast_ref::<LoadError>() {
        error!(error = %load, "Branch loading failed");
        eprintln!("error: {load}");
        return ExitCode::from(2);
    }

    eprintln!("error: {err:#}");
    if err.downcast_ref::<ConfigurationError>().is_some() {
        ExitCode::from(3)
    } else {
        ExitCode::FAILURE
    }
}
