//! Configuration types for the inference library

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, gemini};

/// Sampling parameters for a single generation call
///
/// Serializes directly into Gemini's `generationConfig` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature (lower = more deterministic)
    pub temperature: f32,
    /// Nucleus sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Low-temperature config without nucleus/top-k, for short extraction calls
    pub fn precise(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            top_p: None,
            top_k: None,
            max_output_tokens,
        }
    }

    /// Same sampling parameters with a different token ceiling
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: defaults::TEMPERATURE,
            top_p: Some(defaults::TOP_P),
            top_k: Some(defaults::TOP_K),
            max_output_tokens: defaults::MAX_OUTPUT_TOKENS,
        }
    }
}

/// Connection settings for the Gemini backend
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent with every request
    pub api_key: String,
    /// Model handle (e.g., "gemini-2.0-flash")
    pub model: String,
    /// API root, without a trailing `/models`
    pub base_url: String,
}

impl GeminiConfig {
    /// Config for the default model and endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: gemini::MODEL.to_string(),
            base_url: gemini::BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
