//! Command-line interface definition for Murmur
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot prompts, and
//! model discovery.

use clap::{Parser, Subcommand};

/// Murmur - streaming chat with a local Ollama model
///
/// Forwards prompts to a locally running Ollama server and streams
/// the response back, keeping conversation history for the session.
#[derive(Parser, Debug, Clone)]
#[command(name = "murmur")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Murmur
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session with the local model
    Chat {
        /// Override the Ollama server host from config
        #[arg(long)]
        host: Option<String>,

        /// Override the model name from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Send a single prompt and stream the completion to stdout
    Ask {
        /// Prompt text to send to the model
        prompt: String,

        /// Override the Ollama server host from config
        #[arg(long)]
        host: Option<String>,

        /// Override the model name from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List models installed on the Ollama server
    Models {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Override the Ollama server host from config
        #[arg(long)]
        host: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
