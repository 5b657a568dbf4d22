//! Pictag CLI - automatic tags and names for images.
//!
//! Pictag runs an image classifier and an object detector over each image
//! and turns their predictions into a short tag list and a display name.
//!
//! # Usage
//!
//! ```bash
//! # Tag a single image
//! pictag tag beach.jpg
//!
//! # Tag a directory, with zero-shot keywords, as JSON Lines
//! pictag tag ./wallpapers/ --keywords --format jsonl --output tags.jsonl
//!
//! # Fetch the ONNX models
//! pictag models download
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Pictag - automatic tags and names for images.
#[derive(Parser, Debug)]
#[command(name = "pictag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Suggest tags and a name for images
    Tag(cli::tag::TagArgs),

    /// Pick zero-shot keywords for one image
    Keywords(cli::keywords::KeywordsArgs),

    /// Manage recognition models (download, list, path)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't up yet, so config warnings go straight to stderr.
    let config = match pictag_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pictag config path`."
            );
            pictag_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Pictag v{}", pictag_core::VERSION);

    match cli.command {
        Commands::Tag(args) => cli::tag::execute(args, config).await,
        Commands::Keywords(args) => cli::keywords::execute(args, config).await,
        Commands::Models(args) => cli::models::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
