//! Murmur - streaming chat with a local Ollama model
//!
//! This library provides the core functionality for the Murmur chat
//! CLI: a model client for the local inference server, a session
//! controller that owns the conversation and drives the turn-taking
//! protocol, and the rendering seam between the two.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `client`: Model client abstraction and the Ollama implementation
//! - `session`: Conversation history and the streaming turn controller
//! - `render`: Render sink trait and the terminal renderer
//! - `commands`: Handlers behind the CLI subcommands
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use murmur::client::OllamaClient;
//! use murmur::config::Config;
//! use murmur::render::TerminalRenderer;
//! use murmur::session::SessionController;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml")?;
//!     config.validate()?;
//!
//!     let mut client = OllamaClient::new(config.ollama.clone())?;
//!     client.initialize().await?;
//!
//!     let mut controller = SessionController::new(Box::new(client));
//!     let mut renderer = TerminalRenderer::new();
//!     controller
//!         .submit_prompt("Hello, who are you?", &mut renderer)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use client::{FragmentStream, LocalModel, ModelClient, ModelHandle, OllamaClient};
pub use config::Config;
pub use error::{MurmurError, Result};
pub use render::{RenderSink, TerminalRenderer};
pub use session::{ControllerState, Message, Role, Session, SessionController, CURSOR_MARKER};
