//! AtomBot CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Interactive conversation with the admissions assistant
//! - `ask`: Send a single message and print the reply
//! - `context`: Print the grounding context the assistant is given
//! - `init`: Write default config and program files
//! - `doctor`: Diagnose configuration and program data

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod input;

#[derive(Parser)]
#[command(
    name = "atombot",
    about = "AtomBot — admissions assistant for the Atom facilitator program",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.atombot/config.toml
    #[arg(short, long, global = true, env = "ATOMBOT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat,

    /// Ask a single question
    Ask {
        /// The message to send
        #[arg(short, long)]
        message: String,
    },

    /// Print the knowledge context
    Context,

    /// Initialize configuration and program data
    Init,

    /// Diagnose configuration health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat => commands::chat::run(config_path).await?,
        Commands::Ask { message } => commands::ask::run(config_path, &message).await?,
        Commands::Context => commands::context::run(config_path).await?,
        Commands::Init => commands::init::run(config_path).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
