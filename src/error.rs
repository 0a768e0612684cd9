//! Error types for Murmur
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Murmur operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, model initialization, streamed completions,
/// and session handling.
#[derive(Error, Debug)]
pub enum MurmurError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model initialization failed (server unreachable, model not pulled)
    ///
    /// Fatal at startup: the process must refuse to accept prompts.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// A completion was requested without an initialized model handle,
    /// or the server could not be reached at all
    #[error("Connection error: {0}")]
    Connection(String),

    /// The streaming request failed after it had started
    #[error("Inference error: {0}")]
    Inference(String),

    /// Session controller contract violation
    #[error("Session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Murmur operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
