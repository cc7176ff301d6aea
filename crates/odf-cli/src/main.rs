//! ODF CLI - resolve game object definitions
//!
//! Collects per-file ODF records, resolves inheritance, links ordnance and
//! powerups to weapons, and sorts the result into categories.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// ODF resolver
#[derive(Parser)]
#[command(name = "odf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine a directory of record files into one store
    Combine {
        /// Directory of record files (JSON, RON or TOML)
        source: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "combined.json")]
        output: PathBuf,

        /// Fail on duplicate identifiers instead of keeping the last one
        #[arg(long)]
        strict: bool,

        /// Convert numeric-looking strings to numbers
        #[arg(long)]
        coerce_numbers: bool,
    },

    /// Resolve inheritance and link references in a combined store
    Resolve {
        /// Combined store
        input: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "resolved.json")]
        output: PathBuf,

        /// Skip links that are already present
        #[arg(long)]
        guarded: bool,
    },

    /// Sort a resolved store into category buckets
    Categorize {
        /// Resolved store
        input: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "categorized.json")]
        output: PathBuf,
    },

    /// Run every stage using a pipeline config
    Run {
        /// Pipeline config file; defaults to odf.{toml,ron,json} in the
        /// current directory
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Combine {
            source,
            output,
            strict,
            coerce_numbers,
        } => commands::combine::run(&source, &output, strict, coerce_numbers)?,

        Commands::Resolve {
            input,
            output,
            guarded,
        } => commands::resolve::run(&input, &output, guarded)?,

        Commands::Categorize { input, output } => commands::categorize::run(&input, &output)?,

        Commands::Run { config } => commands::run::run(config.as_deref())?,
    }

    Ok(())
}
