//! Hosted text-generation backends
//!
//! This library provides a unified interface over hosted LLM text-generation
//! services:
//! - **Gemini**: Google's `generateContent` / `streamGenerateContent` REST API (default)
//!
//! Callers hold an `Arc<dyn InferenceBackend>` and never talk to a provider
//! directly, so tests can substitute a scripted backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use inference::{GeminiBackend, GeminiConfig, GenerationConfig, InferenceBackend};
//! use futures_util::StreamExt;
//!
//! let backend = GeminiBackend::new(GeminiConfig::new(api_key));
//! let mut stream = backend
//!     .generate_stream("Write a haiku", &GenerationConfig::default())
//!     .await?;
//! while let Some(fragment) = stream.next().await {
//!     print!("{}", fragment?);
//! }
//! ```

pub mod backend;
pub mod config;
pub mod constants;
pub mod types;

// Re-exports for convenience
pub use backend::{BackendError, InferenceBackend, SharedBackend, TextStream};

#[cfg(feature = "backend-gemini")]
pub use backend::GeminiBackend;

#[cfg(feature = "test-util")]
pub use backend::scripted::{RecordedCall, ScriptStep, ScriptedBackend};

pub use config::{GeminiConfig, GenerationConfig};
