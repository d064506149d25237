use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

#[derive(Parser)]
#[command(name = "gbrowse")]
#[command(about = "GBrowse - genome browser location and layout engine")]
#[command(version)]
#[command(long_about = "
Resolves location strings against a GFF3 feature database and plans how each
track of the resulting region should be laid out.

Examples:
  gbrowse resolve unc-9 'chrII:1,000..20,000' 'Sequence:B0019'
  gbrowse render chrI:1..50000 --track Genes --option Genes=3
  gbrowse config --example > gbrowse.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (defaults to ./gbrowse.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve location strings into genomic segments
    Resolve {
        /// Locations such as 'unc-9', 'chrI:100..900' or 'Clone:B0019'
        #[arg(required = true)]
        locations: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Plan track layout for a location
    Render {
        /// Location to display
        location: String,

        /// Track to draw (repeatable; defaults to the configured default tracks)
        #[arg(long = "track")]
        tracks: Vec<String>,

        /// Layout option override as LABEL=CODE, code 0-5 (repeatable)
        #[arg(long = "option")]
        options: Vec<String>,

        /// Seed for reproducible feature_limit sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the active configuration or generate an example
    Config {
        /// Print an example configuration
        #[arg(long)]
        example: bool,

        /// Write the example to a file instead of stdout
        #[arg(short, long, requires = "example")]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Set global thread count if specified
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to set thread count")?;
    }

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve { locations, json } => {
            let db = config::open_database(&config)?;
            commands::resolve::execute(&config, &db, locations, json)
        }
        Commands::Render { location, tracks, options, seed, json } => {
            let db = config::open_database(&config)?;
            commands::render::execute(&config, &db, location, tracks, options, seed, json)
        }
        Commands::Config { example, output } => commands::config::execute(&config, example, output),
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        error::print_error_and_exit(&err);
    }
}
