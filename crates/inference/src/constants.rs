//! Provider constants
//!
//! Single source of truth for endpoints and sampling defaults.

/// Gemini REST API configuration
pub mod gemini {
    /// Default API root (v1beta exposes streamGenerateContent with SSE)
    pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    /// Default model handle
    pub const MODEL: &str = "gemini-2.0-flash";
    /// Header carrying the API key
    pub const API_KEY_HEADER: &str = "x-goog-api-key";
    /// Non-streaming generation method
    pub const GENERATE_METHOD: &str = "generateContent";
    /// Streaming generation method (used with `alt=sse`)
    pub const STREAM_METHOD: &str = "streamGenerateContent";
}

/// Default sampling parameters
pub mod defaults {
    pub const TEMPERATURE: f32 = 0.7;
    pub const TOP_P: f32 = 0.8;
    pub const TOP_K: u32 = 40;
    pub const MAX_OUTPUT_TOKENS: u32 = 2048;
}
