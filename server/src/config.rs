//! Process configuration
//!
//! Every setting is a CLI flag with an environment fallback; `main` loads a
//! `.env` file first so both sources work.

use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use inference::constants::gemini;
use inference::GeminiConfig;
use sitesmith_pipeline::constants::{images, limits};
use sitesmith_pipeline::RequestLimits;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sitesmith",
    about = "Streams LLM-generated websites and applications over server-sent events"
)]
pub struct ServerConfig {
    /// API key for the Gemini text-generation service.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,

    /// Gemini model handle.
    #[arg(long, env = "GEMINI_MODEL", default_value = gemini::MODEL)]
    pub gemini_model: String,

    /// Gemini API root.
    #[arg(long, env = "GEMINI_BASE_URL", default_value = gemini::BASE_URL)]
    pub gemini_base_url: String,

    /// Unsplash access key; image search is disabled without it.
    #[arg(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    pub unsplash_access_key: Option<String>,

    /// Unsplash API root.
    #[arg(long, env = "UNSPLASH_BASE_URL", default_value = images::BASE_URL)]
    pub unsplash_base_url: String,

    /// Comma-separated CORS origins, or `*`.
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "*")]
    pub allowed_origins: String,

    /// Host to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Generation requests served at once; further requests wait.
    #[arg(long, env = "MAX_CONCURRENT_GENERATIONS", default_value_t = 8)]
    pub max_concurrent_generations: usize,

    /// Longest accepted description, in characters.
    #[arg(long, env = "MAX_DESCRIPTION_CHARS", default_value_t = limits::MAX_DESCRIPTION_CHARS)]
    pub max_description_chars: usize,
}

/// Parsed form of `--allowed-origins`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        }
    }
}

impl ServerConfig {
    pub fn origins(&self) -> AllowedOrigins {
        AllowedOrigins::parse(&self.allowed_origins)
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::new(self.google_api_key.clone())
            .with_model(self.gemini_model.clone())
            .with_base_url(self.gemini_base_url.clone())
    }

    pub fn limits(&self) -> RequestLimits {
        RequestLimits {
            max_description_chars: self.max_description_chars,
        }
    }

    /// At least one permit, whatever was configured
    pub fn generation_permits(&self) -> usize {
        self.max_concurrent_generations.max(1)
    }

    pub fn cors_layer(&self) -> CorsLayer {
        cors_layer(&self.origins())
    }
}

/// CORS policy for the `/api` routes
///
/// Credentials are only allowed for an explicit origin list.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_TYPE]);

    match origins {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        log::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            layer
                .allow_origin(AllowOrigin::list(values))
                .allow_credentials(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_args() {
        let config = ServerConfig::try_parse_from(["sitesmith", "--google-api-key", "k"]).unwrap();
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.limits().max_description_chars, 8000);
        assert_eq!(config.origins(), AllowedOrigins::Any);
        assert_eq!(config.gemini_config().api_key, "k");
    }

    #[test]
    fn test_origin_list() {
        assert_eq!(
            AllowedOrigins::parse("http://localhost:3000, https://app.test ,"),
            AllowedOrigins::List(vec![
                "http://localhost:3000".to_string(),
                "https://app.test".to_string()
            ])
        );
        assert_eq!(AllowedOrigins::parse("https://a.test,*"), AllowedOrigins::Any);
        assert_eq!(AllowedOrigins::parse(""), AllowedOrigins::Any);
    }

    #[test]
    fn test_permits_never_zero() {
        let config = ServerConfig::try_parse_from([
            "sitesmith",
            "--google-api-key",
            "k",
            "--max-concurrent-generations",
            "0",
        ])
        .unwrap();
        assert_eq!(config.generation_permits(), 1);
    }
}
