//! HackRx QA service
//!
//! Main entry point for the hackrx binary. Provides the HTTP serving
//! command and the offline document ingestion command.

mod commands;
mod http;

use clap::{Parser, Subcommand};
use commands::{IngestCommand, ServeCommand};
use hackrx_core::{config::AppConfig, logging, AppResult};

/// HackRx QA - retrieval-augmented question answering over policy documents
#[derive(Parser, Debug)]
#[command(name = "hackrx")]
#[command(about = "Retrieval-augmented question answering over policy documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP question-answering server
    Serve(ServeCommand),

    /// Fetch a document and load it into the vector index
    Ingest(IngestCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment and optional config file
    let config = AppConfig::load_with_file(cli.config.clone())?;

    // Serve carries its own bind overrides
    let (host, port) = match &cli.command {
        Commands::Serve(cmd) => (cmd.host.clone(), cmd.port),
        Commands::Ingest(_) => (None, None),
    };

    // Apply CLI overrides
    let config = config.with_overrides(host, port, cli.log_level, cli.verbose, cli.no_color);

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("HackRx QA starting");
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Embedding model: {}", config.embedding_model);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ingest(_) => "ingest",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
