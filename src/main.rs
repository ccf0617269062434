//! Doxgraph CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "doxgraph")]
#[command(about = "Build a cross-referenced symbol model from Doxygen-style comments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Project root path (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to doxgraph.toml under the root)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the documentation graph and report diagnostics
    Build {
        /// Files or directories to read (defaults to the root)
        paths: Vec<PathBuf>,

        /// Treat all inputs as one stream sharing group scopes
        #[arg(long)]
        concat: bool,

        /// Write a snapshot to the cache directory
        #[arg(short, long)]
        save: bool,
    },
    /// Build and fail if any error-level diagnostic is reported
    Check {
        paths: Vec<PathBuf>,

        /// Fail on warnings too
        #[arg(long)]
        deny_warnings: bool,
    },
    /// Print the per-group outline
    Outline {
        paths: Vec<PathBuf>,

        /// Maximum entries listed per category
        #[arg(long)]
        max_children: Option<usize>,
    },
    /// Clear the cache
    Clear,
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "doxgraph={0},doxgraph_core={0},doxgraph_indexer={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Doxgraph v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Project root: {}", cli.root.display());

    let context = commands::Context::new(cli.root, cli.config)?;
    match cli.command {
        Commands::Build { paths, concat, save } => commands::build(&context, &paths, concat, save),
        Commands::Check {
            paths,
            deny_warnings,
        } => commands::check(&context, &paths, deny_warnings),
        Commands::Outline {
            paths,
            max_children,
        } => commands::outline(&context, &paths, max_children),
        Commands::Clear => commands::clear(&context),
        Commands::Version => {
            println!("Doxgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
