//! Prompt pipeline for generated web bundles
//!
//! Turns a natural-language description into a streamed HTML/CSS/JavaScript
//! bundle:
//!
//! 1. [`classifier`] decides between the website and application templates
//! 2. [`topics`] asks the LLM for image-search keywords (with local fallback)
//! 3. [`images`] fetches one stock photo per topic
//! 4. [`prompt`] assembles the final prompt and its token ceiling
//! 5. [`streamer`] relays the provider's fragments as [`StreamChunk`]s
//!
//! [`SiteGenerator`] wires these together around injected provider handles.
//!
//! # Example
//!
//! ```rust,ignore
//! use sitesmith_pipeline::{SiteGenerator, UnsplashClient};
//! use futures_util::StreamExt;
//!
//! let generator = SiteGenerator::new(backend, Arc::new(UnsplashClient::new(key)));
//! let request = generator.route("Create a bakery website");
//! let mut chunks = generator.generate(&request).await?;
//! while let Some(chunk) = chunks.next().await {
//!     println!("data: {}", chunk.sse_data());
//! }
//! ```

pub mod bundle;
pub mod classifier;
pub mod constants;
pub mod error;
pub mod generator;
pub mod images;
pub mod prompt;
pub mod request;
pub mod streamer;
pub mod topics;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use bundle::{extract_bundle, BundleAccumulator, CodeBundle};
pub use classifier::{classify, ApplicationFocus, ApplicationProfile, Classification};
pub use error::{PipelineError, Result, ValidationError};
pub use generator::SiteGenerator;
pub use images::{
    ImageDescriptor, ImageSearch, ImageSearchError, NoImageSearch, SharedImageSearch,
    UnsplashClient,
};
pub use prompt::{build_prompt, PromptDocument};
pub use request::{CurrentSite, GenerationRequest, RequestKind, RequestLimits};
pub use streamer::{ChunkStream, GenerationStreamer, StreamChunk};
pub use topics::{TopicBounds, TopicContext, TopicExtractor};
