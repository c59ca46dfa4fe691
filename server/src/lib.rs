//! HTTP relay for the site generation pipeline
//!
//! Exposes the pipeline over axum: three SSE generation endpoints, a direct
//! image search endpoint and a health probe.

pub mod config;
pub mod error;
pub mod routes;
pub mod sse;
pub mod state;

use std::sync::Arc;

use inference::{GeminiBackend, InferenceBackend, SharedBackend};
use sitesmith_pipeline::{NoImageSearch, SharedImageSearch, SiteGenerator, UnsplashClient};

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the provider clients described by `config`
pub fn build_state(config: &ServerConfig) -> AppState {
    let backend: SharedBackend = Arc::new(GeminiBackend::new(config.gemini_config()));

    let images: SharedImageSearch = match config.unsplash_access_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {
            Arc::new(UnsplashClient::new(key).with_base_url(config.unsplash_base_url.clone()))
        }
        _ => {
            log::warn!("UNSPLASH_ACCESS_KEY not set, image search is disabled");
            Arc::new(NoImageSearch)
        }
    };

    let generator = SiteGenerator::new(backend, images).with_limits(config.limits());
    AppState::new(generator, config.generation_permits())
}

/// Run the server until it fails
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let backend = GeminiBackend::new(config.gemini_config());
    if backend.health_check().await {
        log::info!("Gemini model '{}' is reachable", config.gemini_model);
    } else {
        log::warn!(
            "Gemini model '{}' did not answer the startup check; requests may fail",
            config.gemini_model
        );
    }

    let app = router(build_state(&config), config.cors_layer());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    log::info!("Sitesmith listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
