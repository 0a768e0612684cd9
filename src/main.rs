//! Murmur - streaming chat CLI for a local Ollama model
//!
//! Main entry point: initializes tracing, loads configuration, and
//! dispatches to the command handlers.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use murmur::cli::{Cli, Commands};
use murmur::commands;
use murmur::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load and validate configuration
    let config = Config::load(&cli.config)?;
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { host, model } => {
            commands::chat::run_chat(config, host, model).await?;
            Ok(())
        }
        Commands::Ask {
            prompt,
            host,
            model,
        } => {
            commands::ask::run_ask(config, prompt, host, model).await?;
            Ok(())
        }
        Commands::Models { json, host } => {
            commands::models::list_models(&config, host, json).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "murmur=debug" } else { "murmur=info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
