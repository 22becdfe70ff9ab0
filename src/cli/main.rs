//! CLI binary entry point for botanical-etl

#[cfg(feature = "cli")]
use anyhow::Context;
#[cfg(feature = "cli")]
use botanical_etl::cli::commands::{
    handle_extract, handle_load, handle_run, handle_summary, handle_transform,
};
#[cfg(feature = "cli")]
use botanical_etl::config::PipelineConfig;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "botanical-etl")]
#[command(about = "Extract, normalise and load botanical sensor readings")]
#[command(version)]
struct Cli {
    /// Log progress at info level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./botanical-etl.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Discover endpoints, fetch every plant and save the raw JSON
    Extract,
    /// Normalise the raw JSON into one CSV per table
    Transform,
    /// Load the CSV tables into DuckDB
    Load,
    /// Summarise readings per plant into a dated CSV
    Summary {
        /// Only include readings taken in the last N hours
        #[arg(long)]
        since_hours: Option<u32>,
    },
    /// Extract, transform and load in one go
    Run,
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> anyhow::Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Extract => {
            let count = handle_extract(&config).context("Extract failed")?;
            println!(
                "Extracted {} plants to {}",
                count,
                config.paths.input.display()
            );
        }
        Commands::Transform => {
            let tables = handle_transform(&config).context("Transform failed")?;
            for table in &tables {
                println!("{}: {} rows", table.name, table.len());
            }
        }
        Commands::Load => {
            let stats = handle_load(&config).context("Load failed")?;
            println!("Loaded into {}: {:?}", config.database.path.display(), stats);
        }
        Commands::Summary { since_hours } => {
            let now = chrono::Utc::now().naive_utc();
            let path = handle_summary(&config, since_hours, now).context("Summary failed")?;
            println!("Summary written to {}", path.display());
        }
        Commands::Run => {
            handle_run(&config).context("Pipeline failed")?;
            println!("Pipeline complete");
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
