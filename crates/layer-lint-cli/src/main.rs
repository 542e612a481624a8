//! layer-lint CLI tool.
//!
//! Usage:
//! ```bash
//! layer-lint check [OPTIONS] [PROJECT]
//! layer-lint list-rules
//! layer-lint init
//! ```
//!
//! Exit codes: `0` clean, `1` violations found, `2` configuration or
//! fatal error.

use anyhow::Result;
use clap::{Parser, Subcommand};
use layer_lint_core::{AnalyzerError, PolicyError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "LAYER_LINT_LOG";

/// Layered-architecture boundary checker for JavaScript/TypeScript trees
#[derive(Parser)]
#[command(name = "layer-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the policy file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a project against its policy
    Check {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        project: PathBuf,

        /// Source root to scan, overriding `analyzer.root`
        #[arg(long)]
        root: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated names or codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List available rules
    ListRules,

    /// Write the default policy to ./layer-lint.toml
    Init {
        /// Overwrite an existing policy file
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output, grouped by file.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            project,
            root,
            format,
            rules,
            exclude,
        } => {
            let source = config_resolver::resolve(&project, cli.config.as_deref());
            commands::check::run(&commands::check::CheckOptions {
                project: &project,
                root: root.as_deref(),
                format,
                rules: rules.as_deref(),
                exclude,
                source: &source,
            })
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Prints a fatal error, through miette for the library's diagnostics.
fn report(err: anyhow::Error) {
    let err = match err.downcast::<PolicyError>() {
        Ok(policy) => {
            eprintln!("{:?}", miette::Report::new(policy));
            return;
        }
        Err(err) => err,
    };
    match err.downcast::<AnalyzerError>() {
        Ok(analyzer) => eprintln!("{:?}", miette::Report::new(analyzer)),
        Err(err) => eprintln!("error: {err:#}"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            report(err);
            ExitCode::from(2)
        }
    }
}
