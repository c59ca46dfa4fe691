//! Pluggable inference backend abstraction
//!
//! This module provides a trait-based abstraction over hosted text-generation
//! services. All backends implement the same interface, so application code
//! can be handed any of them (or a scripted double in tests).

#[cfg(feature = "backend-gemini")]
pub mod gemini;

#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::Stream;

use crate::config::GenerationConfig;

#[cfg(feature = "backend-gemini")]
pub use gemini::GeminiBackend;

/// Error types for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider returned no text")]
    EmptyResponse,

    #[error("Stream error: {0}")]
    Stream(String),
}

/// Incremental text fragments in provider emission order
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, BackendError>> + Send>>;

/// Shared backend handle passed into pipeline components
pub type SharedBackend = Arc<dyn InferenceBackend>;

/// The core trait that all inference backends must implement.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &'static str;

    /// Generate a complete response for a prompt
    async fn generate(&self, prompt: &str, config: &GenerationConfig)
        -> Result<String, BackendError>;

    /// Stream response fragments as the provider produces them
    ///
    /// Errors before the first fragment are returned directly; errors after
    /// that arrive as `Err` items on the stream.
    async fn generate_stream(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<TextStream, BackendError>;

    /// Health check - verify the provider is reachable with our credentials
    async fn health_check(&self) -> bool;
}
