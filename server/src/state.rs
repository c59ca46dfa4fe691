use std::sync::Arc;

use sitesmith_pipeline::SiteGenerator;
use tokio::sync::Semaphore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<SiteGenerator>,
    /// Bounds in-flight generations; a permit lives as long as its stream
    pub permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(generator: SiteGenerator, max_concurrent_generations: usize) -> Self {
        Self {
            generator: Arc::new(generator),
            permits: Arc::new(Semaphore::new(max_concurrent_generations.max(1))),
        }
    }
}
