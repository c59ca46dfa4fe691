//! HTTP routes
//!
//! The three generation endpoints answer with an SSE stream once the request
//! is valid; the image endpoint proxies a single photo search.

use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use sitesmith_pipeline::{CodeBundle, CurrentSite, GenerationRequest, ImageDescriptor};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::error::ApiError;
use crate::sse::{sse_response, StreamTracker};
use crate::state::AppState;

/// Upper bound for `count` on the image endpoint
const MAX_IMAGE_COUNT: usize = 30;

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/api/generate-website", post(generate_website))
        .route("/api/modify-website", post(modify_website))
        .route("/api/generate-application", post(generate_application))
        .route("/api/unsplash-images", get(unsplash_images))
        .layer(cors);

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DescriptionBody {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModifyBody {
    #[serde(default)]
    modification_description: Option<String>,
    #[serde(default)]
    current_html: Option<String>,
    #[serde(default)]
    current_css: Option<String>,
    #[serde(default)]
    current_js: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageQuery {
    query: Option<String>,
    count: Option<String>,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn generate_website(
    State(state): State<AppState>,
    payload: Result<Json<DescriptionBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|_| ApiError::no_json())?;
    let description = body.description.unwrap_or_default();
    log::info!("Received website description: {}", description);

    let request = state.generator.route(description);
    stream_generation(&state, request).await
}

async fn generate_application(
    State(state): State<AppState>,
    payload: Result<Json<DescriptionBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|_| ApiError::no_json())?;
    let description = body.description.unwrap_or_default();
    log::info!("Generating application: {}", description);

    stream_generation(&state, GenerationRequest::application(description)).await
}

async fn modify_website(
    State(state): State<AppState>,
    payload: Result<Json<ModifyBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|_| ApiError::no_json())?;
    let request = GenerationRequest::modification(
        body.modification_description.unwrap_or_default(),
        body.current_html.unwrap_or_default(),
        body.current_css.unwrap_or_default(),
        body.current_js,
    );
    log::info!("Received modification request: {}", request.description());

    stream_generation(&state, request).await
}

async fn stream_generation(
    state: &AppState,
    request: GenerationRequest,
) -> Result<Response, ApiError> {
    let permit = state.permits.clone().acquire_owned().await?;

    let initial = match &request {
        GenerationRequest::WebsiteModify {
            current: CurrentSite { html, css, js },
            ..
        } => CodeBundle {
            html: html.clone(),
            css: css.clone(),
            js: js.clone(),
        },
        _ => CodeBundle::default(),
    };

    let chunks = state.generator.generate(&request).await?;
    let tracker = StreamTracker::new(request.kind(), permit, initial);
    Ok(sse_response(chunks, tracker).into_response())
}

async fn unsplash_images(
    State(state): State<AppState>,
    Query(params): Query<ImageQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("No query provided".to_string()))?;
    let count = params
        .count
        .and_then(|c| c.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_IMAGE_COUNT);

    let images: Vec<ImageDescriptor> = state
        .generator
        .image_search()
        .search(&query, count)
        .await
        .map_err(ApiError::Upstream)?;
    Ok(Json(json!({ "images": images })))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };
    ApiError::internal(message).into_response()
}
