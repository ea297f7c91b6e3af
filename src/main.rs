//! coq-defsplit - Split Coq scripts into top-level definitions.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coq_defsplit::config::{ConfigSource, SplitterConfig};
use coq_defsplit::display;
use coq_defsplit::segment::split_statements;
use coq_defsplit::splitter::DefinitionSplitter;

#[derive(Parser)]
#[command(
    name = "coq-defsplit",
    about = "Split Coq scripts into top-level definitions",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a .v file into definitions.
    Split {
        /// The Coq script to split.
        file: PathBuf,
        /// Print chunks as JSON.
        #[arg(long)]
        json: bool,
        /// Do not truncate statements.
        #[arg(long)]
        raw: bool,
        /// coqtop binary to use.
        #[arg(long)]
        coqtop: Option<PathBuf>,
        /// Extra argument for coqtop (repeatable).
        #[arg(long = "arg", allow_hyphen_values = true)]
        args: Vec<String>,
        /// Timeout in seconds (0 disables it).
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show what a coqtop binary supports.
    Probe {
        /// coqtop binary to probe.
        #[arg(long)]
        coqtop: Option<PathBuf>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<SplitterConfig, ExitCode> {
    ConfigSource::from_cli(path).load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        ExitCode::FAILURE
    })
}

async fn run_split(config: &SplitterConfig, file: &Path, json: bool, raw: bool) -> ExitCode {
    let source = match tokio::fs::read_to_string(file).await {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(file = %file.display(), error = %e, "Failed to read script");
            return ExitCode::FAILURE;
        }
    };

    let statements = split_statements(&source);
    tracing::info!(
        file = %file.display(),
        statements = statements.len(),
        "Splitting script"
    );

    let mut splitter = DefinitionSplitter::new(config);
    let outcome = match splitter.split(&statements).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Split failed");
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize chunks");
                return ExitCode::FAILURE;
            }
        }
    } else {
        display::print_outcome(&outcome, raw);
    }
    ExitCode::SUCCESS
}

async fn run_probe(config: &SplitterConfig) -> ExitCode {
    let mut splitter = DefinitionSplitter::new(config);
    match splitter.capabilities().await {
        Ok(capabilities) => {
            display::print_capabilities(&config.coqtop, &capabilities);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Probe failed");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match load_config(cli.config) {
        Ok(config) => config,
        Err(code) => return code,
    };

    match cli.command {
        Commands::Split {
            file,
            json,
            raw,
            coqtop,
            args,
            timeout,
        } => {
            if let Some(coqtop) = coqtop {
                config.coqtop = coqtop;
            }
            if !args.is_empty() {
                config.coqtop_args = args;
            }
            if timeout.is_some() {
                config.timeout_secs = timeout;
            }
            run_split(&config, &file, json, raw).await
        }
        Commands::Probe { coqtop } => {
            if let Some(coqtop) = coqtop {
                config.coqtop = coqtop;
            }
            run_probe(&config).await
        }
    }
}
