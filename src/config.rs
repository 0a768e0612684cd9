//! Configuration management for Murmur
//!
//! This module handles loading, parsing, and validating configuration
//! from a YAML file with environment variable overrides.

use crate::error::{MurmurError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Murmur
///
/// Holds everything needed to reach the local Ollama server and to
/// bound the lifetime of streaming requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ollama server configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to chat with
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Timeout for establishing the server connection (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Deadline for an entire streaming request (seconds)
    ///
    /// Bounds each completion end to end so a hung server fails the
    /// turn instead of blocking the session forever.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "phi3.5:latest".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
            connect_timeout_seconds: default_connect_timeout(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration; defaults are used
    /// (with a warning) when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MurmurError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MurmurError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("MURMUR_OLLAMA_HOST") {
            self.ollama.host = host;
        }

        if let Ok(model) = std::env::var("MURMUR_OLLAMA_MODEL") {
            self.ollama.model = model;
        }

        if let Ok(timeout) = std::env::var("MURMUR_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.ollama.request_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid MURMUR_REQUEST_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `MurmurError::Config` when the host is empty or not an
    /// http(s) URL, the model name is empty, or a timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let host = self.ollama.host.trim();
        if host.is_empty() {
            return Err(MurmurError::Config("Ollama host must not be empty".to_string()).into());
        }

        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(MurmurError::Config(format!(
                "Ollama host must be an http(s) URL, got: {}",
                host
            ))
            .into());
        }

        if self.ollama.model.trim().is_empty() {
            return Err(MurmurError::Config("model name must not be empty".to_string()).into());
        }

        if self.ollama.connect_timeout_seconds == 0 || self.ollama.request_timeout_seconds == 0 {
            return Err(
                MurmurError::Config("timeouts must be at least 1 second".to_string()).into(),
            );
        }

        Ok(())
    }
}
