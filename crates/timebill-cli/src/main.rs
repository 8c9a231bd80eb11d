//! CLI application for invoicing time-tracking tables.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, entries, extract, generate};

/// Turn time-tracking tables into PDF invoices
#[derive(Parser)]
#[command(name = "timebill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract time entries from a rendered table
    Extract(extract::ExtractArgs),

    /// Generate a PDF invoice from a rendered table
    Generate(generate::GenerateArgs),

    /// Show the flattened entries of an entry envelope
    Entries(entries::EntriesArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Extract(args) => extract::run(args).await,
        Commands::Generate(args) => generate::run(args, cli.config.as_deref()).await,
        Commands::Entries(args) => entries::run(args).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
