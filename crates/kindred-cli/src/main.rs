//! Kindred CLI - Command-line interface for Kindred
//!
//! This is the main entry point for users interacting with Kindred.
//! It provides commands for recording family members, querying the
//! family graph, and serving it to other clients.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "kindred")]
#[command(author = "Kindred Contributors")]
#[command(version)]
#[command(about = "Family trees and relationship paths", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the .kindred workspace
    #[arg(short, long, global = true, env = "KINDRED_DIR", default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Kindred in the workspace directory
    Init,

    /// Add a family member
    Add {
        name: String,
        surname: String,
    },

    /// Record a relation between two people
    Link {
        /// Parent (for child) or either partner (for spouse)
        from: u64,

        to: u64,

        /// "child" or "spouse"
        kind: String,
    },

    /// List family members
    Members {
        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List marriages
    Spouses {
        #[arg(long)]
        json: bool,
    },

    /// Show the family tree from the oldest root ancestor
    Tree {
        #[arg(long)]
        json: bool,
    },

    /// Explain how two people are related
    Relation {
        id1: u64,
        id2: u64,

        #[arg(long)]
        json: bool,
    },

    /// Show store status and statistics
    Status,

    /// Export the graph to JSON
    Export {
        /// Output file
        #[arg(short, long, default_value = "kindred-graph.json")]
        output: PathBuf,
    },

    /// Start the Kindred server
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Headless mode: bind to 0.0.0.0 for remote access
        #[arg(long)]
        headless: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let dir = cli.dir.as_path();
    let result = match cli.command {
        Commands::Init => commands::init(dir),
        Commands::Add { name, surname } => commands::add(dir, &name, &surname),
        Commands::Link { from, to, kind } => commands::link(dir, from, to, &kind),
        Commands::Members { json } => commands::members(dir, json),
        Commands::Spouses { json } => commands::spouses(dir, json),
        Commands::Tree { json } => commands::tree(dir, json),
        Commands::Relation { id1, id2, json } => commands::relation(dir, id1, id2, json),
        Commands::Status => commands::status(dir),
        Commands::Export { output } => commands::export(dir, &output),
        Commands::Serve { port, headless } => commands::serve(dir, port, headless).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
