//! Strata command-line interface.
//!
//! Runs relationship audits over architecture specifications and manages the
//! audit snapshot history.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use strata_core::audit::Confidence;
use strata_core::Config;
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "strata")]
#[command(
    version,
    about = "Relationship audits for layered architecture models",
    long_about = None
)]
struct Cli {
    /// Use this config file instead of strata.toml / ~/.config/strata/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit the relationships of a specification (and optionally a model)
    Audit {
        /// Specification file or directory
        #[arg(short, long)]
        spec: PathBuf,

        /// Model file for instance-level balance
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Only audit this layer
        #[arg(short, long)]
        layer: Option<String>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the rendered report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the report as a snapshot
        #[arg(long)]
        save: bool,

        /// Drop duplicate candidates below this confidence
        #[arg(long, value_enum)]
        min_confidence: Option<ConfidenceArg>,
    },
    /// Compare two audit snapshots (defaults to the latest two)
    AuditDiff {
        /// Older snapshot id or timestamp
        #[arg(long, requires = "after")]
        before: Option<String>,

        /// Newer snapshot id or timestamp
        #[arg(long, requires = "before")]
        after: Option<String>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Manage stored audit snapshots
    Snapshots {
        #[command(subcommand)]
        action: SnapshotAction,
    },
    /// Print the default configuration
    Config,
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// List snapshots, newest first
    List,
    /// Show a stored report
    Show {
        /// Snapshot id or timestamp
        id: String,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Delete a snapshot
    Delete {
        /// Snapshot id or timestamp
        id: String,
    },
    /// Delete every snapshot
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConfidenceArg {
    High,
    Medium,
    Low,
}

impl From<ConfidenceArg> for Confidence {
    fn from(arg: ConfidenceArg) -> Self {
        match arg {
            ConfidenceArg::High => Confidence::High,
            ConfidenceArg::Medium => Confidence::Medium,
            ConfidenceArg::Low => Confidence::Low,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("strata_core={level},strata={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Audit {
            spec,
            model,
            layer,
            format,
            output,
            save,
            min_confidence,
        } => {
            let args = commands::AuditArgs {
                spec,
                model,
                layer,
                format: commands::resolve_format(format, &config),
                output,
                save,
                min_confidence: min_confidence.map(Confidence::from),
            };
            commands::audit(&config, args).await
        }
        Commands::AuditDiff {
            before,
            after,
            format,
        } => {
            let ids = before.zip(after);
            commands::audit_diff(&config, ids, commands::resolve_format(format, &config)).await
        }
        Commands::Snapshots { action } => match action {
            SnapshotAction::List => commands::snapshots_list(&config).await,
            SnapshotAction::Show { id, format } => {
                commands::snapshots_show(&config, &id, commands::resolve_format(format, &config))
                    .await
            }
            SnapshotAction::Delete { id } => commands::snapshots_delete(&config, &id).await,
            SnapshotAction::Clear => commands::snapshots_clear(&config).await,
        },
        Commands::Config => {
            print!("{}", Config::default_config_string());
            Ok(())
        }
    }
}
