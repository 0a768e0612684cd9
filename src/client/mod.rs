//! Model client for Murmur
//!
//! This module contains the abstraction over the local inference server
//! and its Ollama implementation. The calling layer sees a single
//! streaming-completion operation and stays agnostic to the transport.

pub mod base;
pub mod ollama;

pub use base::{FragmentSender, FragmentStream, LocalModel, ModelClient};
pub use ollama::{ModelHandle, OllamaClient};
