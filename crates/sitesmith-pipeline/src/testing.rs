//! Image-search doubles for tests

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::images::{credit_line, ImageDescriptor, ImageSearch, ImageSearchError};

/// A descriptor with predictable URLs derived from `id`
pub fn sample_image(topic: &str, id: &str) -> ImageDescriptor {
    ImageDescriptor {
        small_url: format!("https://images.test/{}/small", id),
        regular_url: format!("https://images.test/{}/regular", id),
        thumb_url: format!("https://images.test/{}/thumb", id),
        alt_text: format!("{} photo", topic),
        credit: credit_line(&format!("Photographer {}", id), "Unsplash"),
        download_url: format!("https://images.test/{}/download", id),
        topic: topic.to_string(),
    }
}

/// Returns canned images per topic and records every query
#[derive(Default)]
pub struct StaticImageSearch {
    by_topic: HashMap<String, Vec<ImageDescriptor>>,
    default: Vec<ImageDescriptor>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StaticImageSearch {
    /// Reports "no images" for every topic
    pub fn empty() -> Self {
        Self::default()
    }

    /// Images returned for topics without a specific entry
    pub fn with_default(mut self, images: Vec<ImageDescriptor>) -> Self {
        self.default = images;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>, images: Vec<ImageDescriptor>) -> Self {
        self.by_topic.insert(topic.into(), images);
        self
    }

    /// (topic, count) pairs in call order
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl ImageSearch for StaticImageSearch {
    fn provider(&self) -> &'static str {
        "Static"
    }

    async fn search(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<ImageDescriptor>, ImageSearchError> {
        self.queries.lock().push((topic.to_string(), count));

        let images = self.by_topic.get(topic).unwrap_or(&self.default);
        if images.is_empty() {
            return Err(ImageSearchError::Empty {
                query: topic.to_string(),
            });
        }
        Ok(images.iter().take(count).cloned().collect())
    }
}

/// Fails every search with a provider status error
#[derive(Debug, Clone)]
pub struct FailingImageSearch {
    pub status: u16,
}

impl Default for FailingImageSearch {
    fn default() -> Self {
        Self { status: 503 }
    }
}

#[async_trait]
impl ImageSearch for FailingImageSearch {
    fn provider(&self) -> &'static str {
        "Failing"
    }

    async fn search(
        &self,
        _topic: &str,
        _count: usize,
    ) -> Result<Vec<ImageDescriptor>, ImageSearchError> {
        Err(ImageSearchError::Status {
            status: self.status,
            body: "service unavailable".to_string(),
        })
    }
}
