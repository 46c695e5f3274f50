//! Twinleaf CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "twinleaf")]
#[command(about = "Lineage and column diffs between base and current project snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./twinleaf.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write JSON output to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge two lineage snapshots into one provenance-tagged graph
    Lineage {
        /// Base snapshot JSON
        #[arg(long)]
        base: PathBuf,

        /// Current snapshot JSON
        #[arg(long)]
        current: PathBuf,

        /// Selector expression, e.g. "state:modified+"
        #[arg(short, long)]
        select: Option<String>,

        /// Print counts instead of the graph
        #[arg(long)]
        summary: bool,
    },
    /// Merge two column orderings and classify each column
    Columns {
        /// Comma-separated base column names
        #[arg(long, value_delimiter = ',')]
        base: Vec<String>,

        /// Comma-separated current column names
        #[arg(long, value_delimiter = ',')]
        current: Vec<String>,
    },
    /// Diff typed columns for every resource in a JSON file
    Schema {
        /// JSON array of {resource_id, base, current}
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine
    dotenvy::dotenv().ok();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("TWINLEAF_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("twinleaf={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Twinleaf v{}", env!("CARGO_PKG_VERSION"));

    let config = config::TwinleafConfig::load(cli.config.as_deref())?;
    let out = commands::Output::new(cli.output, config.output.pretty);

    match cli.command {
        Commands::Lineage {
            base,
            current,
            select,
            summary,
        } => {
            let select = select.or(config.lineage.default_select);
            commands::lineage(&out, &base, &current, select.as_deref(), summary)
        }
        Commands::Columns { base, current } => commands::columns(&out, &base, &current),
        Commands::Schema { input } => commands::schema(&out, &input),
        Commands::Version => {
            println!("Twinleaf v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
