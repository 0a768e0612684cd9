//! Ollama model client for Murmur
//!
//! Connects to a local (or remote) Ollama server, verifies at startup
//! that the configured model is actually installed, and turns the
//! NDJSON body of `/api/chat` streaming responses into a
//! [`FragmentStream`].

use crate::client::base::{FragmentSender, FragmentStream, LocalModel, ModelClient};
use crate::config::OllamaConfig;
use crate::error::{MurmurError, Result};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Capacity of the fragment channel between decode task and consumer
const FRAGMENT_CHANNEL_CAPACITY: usize = 32;

/// Proof that a named model was verified on the server
///
/// A handle exists only after [`OllamaClient::initialize`] succeeded;
/// completion requests are refused without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    model: String,
    host: String,
}

impl ModelHandle {
    fn new(model: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            host: host.into(),
        }
    }

    /// Name of the verified model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Server the model is hosted on
    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Ollama API client
///
/// Construction only builds the HTTP client; [`initialize`] must
/// succeed before completions can be requested.
///
/// # Examples
///
/// ```no_run
/// use murmur::client::{ModelClient, OllamaClient};
/// use murmur::config::OllamaConfig;
///
/// # async fn example() -> murmur::error::Result<()> {
/// let mut client = OllamaClient::new(OllamaConfig::default())?;
/// client.initialize().await?;
///
/// let mut stream = client.stream_completion("Hello, who are you?").await?;
/// while let Some(fragment) = stream.next().await {
///     print!("{}", fragment?);
/// }
/// # Ok(())
/// # }
/// ```
///
/// [`initialize`]: OllamaClient::initialize
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
    handle: Option<ModelHandle>,
}

/// Request structure for the chat endpoint
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Message structure for the chat endpoint
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// One NDJSON line of a streaming chat response
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: ChunkMessage,
    #[serde(default)]
    done: bool,
    /// Ollama reports mid-stream failures as an error line
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

/// Response from the `/api/tags` endpoint
#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

/// Model metadata from `/api/tags`
#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    modified_at: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    ///
    /// * `config` - Ollama configuration containing host, model, and timeouts
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use murmur::client::OllamaClient;
    /// use murmur::config::OllamaConfig;
    ///
    /// let client = OllamaClient::new(OllamaConfig::default());
    /// assert!(client.is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("murmur/0.1.0")
            .build()
            .map_err(|e| {
                MurmurError::Initialization(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            config,
            handle: None,
        })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Whether `initialize` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    /// Verify the server is reachable and the configured model installed
    ///
    /// # Returns
    ///
    /// Returns the verified [`ModelHandle`], which is also stored on the
    /// client for subsequent completion requests.
    ///
    /// # Errors
    ///
    /// Returns `MurmurError::Initialization` when the server cannot be
    /// reached or the model is not in the server's installed list. The
    /// error message carries the remediation steps (`ollama serve`,
    /// `ollama pull`).
    pub async fn initialize(&mut self) -> Result<ModelHandle> {
        let tags = match self.fetch_tags().await {
            Ok(tags) => tags,
            Err(e) => {
                return Err(MurmurError::Initialization(format!(
                    "{}. Make sure the Ollama server is running (`ollama serve`)",
                    e
                ))
                .into());
            }
        };

        if !model_installed(&tags, &self.config.model) {
            return Err(MurmurError::Initialization(format!(
                "model '{}' is not installed on {}. Pull it with `ollama pull {}`",
                self.config.model, self.config.host, self.config.model
            ))
            .into());
        }

        let handle = ModelHandle::new(&self.config.model, &self.config.host);
        self.handle = Some(handle.clone());

        tracing::info!(
            "Initialized Ollama model {} at {}",
            self.config.model,
            self.config.host
        );

        Ok(handle)
    }

    /// List models installed on the server
    ///
    /// Does not require initialization; this is the discovery surface
    /// behind the `models` command.
    pub async fn list_models(&self) -> Result<Vec<LocalModel>> {
        let tags = self.fetch_tags().await?;
        Ok(tags
            .into_iter()
            .map(|tag| LocalModel {
                name: tag.name,
                size: tag.size,
                modified_at: tag.modified_at,
            })
            .collect())
    }

    /// Fetch the installed-model list from `/api/tags`
    async fn fetch_tags(&self) -> Result<Vec<ModelTag>> {
        let url = format!("{}/api/tags", self.config.host);
        tracing::debug!("Fetching installed models from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            MurmurError::Connection(format!(
                "failed to reach Ollama server at {}: {}",
                self.config.host, e
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MurmurError::Connection(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            MurmurError::Connection(format!("failed to parse Ollama tags response: {}", e))
        })?;

        Ok(tags.models)
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn stream_completion(&self, prompt: &str) -> Result<FragmentStream> {
        let handle = self.handle.as_ref().ok_or_else(|| {
            MurmurError::Connection(
                "model client is not initialized; call initialize() before requesting completions"
                    .to_string(),
            )
        })?;

        let url = format!("{}/api/chat", handle.host());
        let request = ChatRequest {
            model: handle.model().to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: true,
        };

        tracing::debug!(
            "Requesting streamed completion from {} ({} prompt chars)",
            url,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| MurmurError::Inference(format!("chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MurmurError::Inference(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let (tx, stream) = FragmentStream::channel(FRAGMENT_CHANNEL_CAPACITY);
        let byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            forward_chat_stream(byte_stream, tx).await;
        });

        Ok(stream)
    }
}

/// Check whether a model name appears in the server's tag list
///
/// Accepts either the exact tag ("phi3.5:latest") or the bare name
/// without a tag suffix ("phi3.5").
fn model_installed(tags: &[ModelTag], model: &str) -> bool {
    tags.iter()
        .any(|tag| tag.name == model || tag.name.split(':').next() == Some(model))
}

/// Forward a streaming chat response body onto the fragment channel
///
/// Splits the byte stream into NDJSON lines at `\n` boundaries. Working
/// on raw bytes keeps multi-byte characters intact even when the
/// transport splits a chunk mid-codepoint.
async fn forward_chat_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>>,
    tx: FragmentSender,
) {
    use futures::StreamExt;

    let mut buffer = BytesMut::new();

    tokio::pin!(byte_stream);

    while let Some(chunk_result) = byte_stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(e) => {
                let _ = tx
                    .send(Err(MurmurError::Inference(format!(
                        "response stream interrupted: {}",
                        e
                    ))))
                    .await;
                return;
            }
        };

        buffer.extend_from_slice(&chunk);

        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line = buffer.split_to(pos + 1);
            if !forward_chat_line(&line[..line.len() - 1], &tx).await {
                return;
            }
        }
    }

    // A body ending without a trailing newline still carries one chunk.
    if !buffer.is_empty() {
        forward_chat_line(&buffer, &tx).await;
    }
}

/// Decode a single NDJSON line and forward its content
///
/// Returns false when the stream is finished: completion signalled,
/// an error forwarded, or the receiver gone.
async fn forward_chat_line(line: &[u8], tx: &FragmentSender) -> bool {
    let line = match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    };
    if line.is_empty() {
        return true;
    }

    match serde_json::from_slice::<ChatChunk>(line) {
        Ok(chunk) => {
            if let Some(message) = chunk.error {
                let _ = tx.send(Err(MurmurError::Inference(message))).await;
                return false;
            }

            if !chunk.message.content.is_empty()
                && tx.send(Ok(chunk.message.content)).await.is_err()
            {
                return false;
            }

            !chunk.done
        }
        Err(e) => {
            let _ = tx
                .send(Err(MurmurError::Inference(format!(
                    "failed to decode stream chunk: {}",
                    e
                ))))
                .await;
            false
        }
    }
}
