//! mpentry CLI - incremental per-page entry generator.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "mpentry")]
#[command(about = "Incremental per-page entry generator for multi-page front-end apps")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to mpentry.toml config file
    #[arg(short, long, default_value = "mpentry.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config, page list and template
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate entries once
    Build {
        /// Write the bundler entry map as JSON to this file
        #[arg(short, long)]
        emit: Option<PathBuf>,

        /// Regenerate every entry and skip backups
        #[arg(long)]
        no_cache: bool,
    },

    /// Generate entries, then regenerate whenever pages or template change
    Watch {
        /// Regenerate every entry and skip backups
        #[arg(long)]
        no_cache: bool,
    },

    /// Remove backups so the next build regenerates everything
    Clean {
        /// Also remove generated entry files
        #[arg(long)]
        entries: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Build { emit, no_cache } => {
            commands::build::run(&cli.config, emit, no_cache).await?;
        }
        Commands::Watch { no_cache } => {
            commands::watch::run(&cli.config, no_cache).await?;
        }
        Commands::Clean { entries } => {
            commands::clean::run(&cli.config, entries).await?;
        }
    }

    Ok(())
}
