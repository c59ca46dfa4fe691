//! End-to-end generation pipeline
//!
//! `SiteGenerator` owns the provider handles and runs one request through
//! validation, topic extraction, image search, prompt assembly and streaming.
//! Everything before streaming is sequential; nothing is shared across requests.

use std::collections::HashSet;

use inference::SharedBackend;

use crate::classifier::{classify, Classification};
use crate::constants::images as image_consts;
use crate::error::Result;
use crate::images::{ImageDescriptor, SharedImageSearch};
use crate::prompt::{build_prompt, PromptDocument};
use crate::request::{GenerationRequest, RequestLimits};
use crate::streamer::{ChunkStream, GenerationStreamer};
use crate::topics::{TopicContext, TopicExtractor};

pub struct SiteGenerator {
    topics: TopicExtractor,
    images: SharedImageSearch,
    streamer: GenerationStreamer,
    limits: RequestLimits,
}

impl SiteGenerator {
    pub fn new(backend: SharedBackend, images: SharedImageSearch) -> Self {
        Self {
            topics: TopicExtractor::new(backend.clone()),
            images,
            streamer: GenerationStreamer::new(backend),
            limits: RequestLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> RequestLimits {
        self.limits
    }

    pub fn image_search(&self) -> &SharedImageSearch {
        &self.images
    }

    /// Build the request for a free-text "generate" call
    ///
    /// Descriptions classified as applications are rerouted to the
    /// application template.
    pub fn route(&self, description: impl Into<String>) -> GenerationRequest {
        let description = description.into();
        match classify(&description) {
            Classification::Application => {
                log::info!("Detected application request, routing to application generator");
                GenerationRequest::application(description)
            }
            Classification::Website => GenerationRequest::website(description),
        }
    }

    /// Validate `request` and assemble its prompt
    pub async fn prepare(&self, request: &GenerationRequest) -> Result<PromptDocument> {
        request.validate(&self.limits)?;
        log::info!(
            "Preparing {} request: {}",
            request.kind().as_str(),
            request.description()
        );

        let images = match request {
            GenerationRequest::WebsiteCreate { description } => {
                let topics = self.topics.extract(description, TopicContext::Website).await;
                self.fetch_images(&topics).await
            }
            GenerationRequest::WebsiteModify { description, .. } => {
                let topics = self
                    .topics
                    .extract(description, TopicContext::Modification)
                    .await;
                self.fetch_images(&topics).await
            }
            GenerationRequest::ApplicationCreate { .. } => Vec::new(),
        };

        Ok(build_prompt(request, &images))
    }

    /// One image per topic, in topic order
    ///
    /// Topics whose search fails are skipped. A photo already taken by an
    /// earlier topic is not repeated.
    pub async fn fetch_images(&self, topics: &[String]) -> Vec<ImageDescriptor> {
        let mut seen = HashSet::new();
        let mut images = Vec::with_capacity(topics.len());

        for topic in topics {
            match self.images.search(topic, image_consts::PER_TOPIC).await {
                Ok(found) => {
                    for image in found {
                        if seen.insert(image.regular_url.clone()) {
                            images.push(image);
                        } else {
                            log::debug!("Skipping duplicate image for topic '{}'", topic);
                        }
                    }
                }
                Err(e) => {
                    log::warn!(
                        "{} search for '{}' failed, continuing without it: {}",
                        self.images.provider(),
                        topic,
                        e
                    );
                }
            }
        }

        log::info!("Fetched {} images for {} topics", images.len(), topics.len());
        images
    }

    /// Prepare `request` and start streaming its generation
    ///
    /// Errors are returned only for requests that fail validation; provider
    /// failures after this point arrive in-band on the stream.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<ChunkStream> {
        let prompt = self.prepare(request).await?;
        Ok(self.streamer.stream(&prompt).await)
    }
}
