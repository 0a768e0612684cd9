//! Base model-client trait and common types
//!
//! Defines the `ModelClient` trait implemented by inference backends,
//! the channel-backed `FragmentStream` handed to consumers, and model
//! metadata returned by server discovery.

use crate::error::{MurmurError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Sending half of a fragment channel
///
/// Held by the transport task that decodes the server response; every
/// item is either one generated fragment or the error that ended the
/// stream.
pub type FragmentSender = mpsc::Sender<std::result::Result<String, MurmurError>>;

/// A finite, single-pass stream of generated text fragments
///
/// Fragments arrive in the order the model produced them. The stream
/// ends when the channel closes (normal completion) or after yielding
/// one `Err` item (transport or server failure). Consuming it twice is
/// not possible; each completion request produces a fresh stream.
pub struct FragmentStream {
    rx: mpsc::Receiver<std::result::Result<String, MurmurError>>,
}

impl FragmentStream {
    /// Create a bounded fragment channel
    ///
    /// Returns the producer half for the transport task and the stream
    /// for the consumer. The bound applies backpressure to the decode
    /// task; the consumption loop is sequential anyway.
    ///
    /// # Examples
    ///
    /// ```
    /// use murmur::client::FragmentStream;
    ///
    /// # tokio_test::block_on(async {
    /// let (tx, mut stream) = FragmentStream::channel(8);
    /// tx.send(Ok("hello".to_string())).await.unwrap();
    /// drop(tx);
    ///
    /// assert_eq!(stream.next().await.unwrap().unwrap(), "hello");
    /// assert!(stream.next().await.is_none());
    /// # });
    /// ```
    pub fn channel(capacity: usize) -> (FragmentSender, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }

    /// Pull the next fragment, or `None` once the stream is exhausted
    pub async fn next(&mut self) -> Option<std::result::Result<String, MurmurError>> {
        self.rx.recv().await
    }
}

/// A model installed on the local inference server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalModel {
    /// Model identifier (e.g. "phi3.5:latest")
    pub name: String,
    /// On-disk size in bytes
    pub size: u64,
    /// Last modification timestamp as reported by the server
    pub modified_at: String,
}

impl LocalModel {
    /// Human-readable on-disk size
    ///
    /// # Examples
    ///
    /// ```
    /// use murmur::client::LocalModel;
    ///
    /// let model = LocalModel {
    ///     name: "phi3.5:latest".to_string(),
    ///     size: 2_147_483_648,
    ///     modified_at: String::new(),
    /// };
    /// assert_eq!(model.display_size(), "2.0GB");
    /// ```
    pub fn display_size(&self) -> String {
        format_size(self.size)
    }
}

/// Format byte size for display
pub(crate) fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.1}{}", size, UNITS[unit_idx])
}

/// Trait implemented by inference backends
///
/// The session controller depends only on this seam, which keeps it
/// testable against scripted backends and agnostic to the transport.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Request a streamed completion for a single prompt
    ///
    /// # Errors
    ///
    /// Fails with `MurmurError::Connection` when the backend was never
    /// initialized, and `MurmurError::Inference` when the request
    /// cannot be issued. Failures after the stream has started are
    /// delivered as the final item of the returned stream instead.
    async fn stream_completion(&self, prompt: &str) -> Result<FragmentStream>;
}
