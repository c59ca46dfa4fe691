//! Stock photo enrichment
//!
//! An `ImageSearch` turns a topic into a short, ranked list of photos. Failures
//! are ordinary values here: callers treat any error as "no images" and carry on.

pub mod unsplash;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::images;

pub use unsplash::UnsplashClient;

/// A photo ready to be referenced from generated HTML
///
/// Field names on the wire follow the browser client (`url` is the small size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    #[serde(rename = "url")]
    pub small_url: String,
    pub regular_url: String,
    pub thumb_url: String,
    #[serde(rename = "alt")]
    pub alt_text: String,
    pub credit: String,
    pub download_url: String,
    /// Normalized query the photo was found with
    pub topic: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageSearchError {
    #[error("Image search is disabled")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No images found for '{query}'")]
    Empty { query: String },

    #[error("Failed to decode search response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Provider name used in credits and logs
    fn provider(&self) -> &'static str;

    /// Up to `count` photos for `topic`, best match first
    async fn search(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<ImageDescriptor>, ImageSearchError>;
}

pub type SharedImageSearch = Arc<dyn ImageSearch>;

/// Stand-in used when no photo provider is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImageSearch;

#[async_trait]
impl ImageSearch for NoImageSearch {
    fn provider(&self) -> &'static str {
        "none"
    }

    async fn search(
        &self,
        _topic: &str,
        _count: usize,
    ) -> Result<Vec<ImageDescriptor>, ImageSearchError> {
        Err(ImageSearchError::Disabled)
    }
}

/// Turn a topic into a search-friendly query
///
/// Lowercases and trims. Phrases longer than two words lose their stop words
/// and keep at most three of the remaining words.
pub fn normalize_query(topic: &str) -> String {
    let clean = topic.trim().to_lowercase();
    let words: Vec<&str> = clean.split_whitespace().collect();
    if words.len() <= images::PHRASE_WORD_THRESHOLD {
        return clean;
    }

    let kept: Vec<&str> = words
        .into_iter()
        .filter(|word| !images::STOP_WORDS.contains(word))
        .collect();
    if kept.is_empty() {
        return clean;
    }
    kept.into_iter()
        .take(images::MAX_QUERY_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of results to ask the provider for when `count` are wanted
pub fn overfetch_count(count: usize) -> usize {
    (count * images::OVERFETCH_FACTOR)
        .max(images::MIN_RESULTS)
        .min(images::MAX_RESULTS)
}

/// Keep `count` results, matches first
///
/// When there are more results than needed, items accepted by `is_match` come
/// first and the rest are filled from non-matches in their original order.
pub fn rerank<T>(results: Vec<T>, count: usize, is_match: impl Fn(&T) -> bool) -> Vec<T> {
    if results.len() <= count {
        return results;
    }

    let mut selected = Vec::with_capacity(count);
    let mut remaining = Vec::new();
    for item in results {
        if selected.len() < count && is_match(&item) {
            selected.push(item);
        } else {
            remaining.push(item);
        }
    }

    let shortfall = count - selected.len();
    selected.extend(remaining.into_iter().take(shortfall));
    selected
}

pub fn credit_line(photographer: &str, provider: &str) -> String {
    format!("Photo by {} on {}", photographer, provider)
}
