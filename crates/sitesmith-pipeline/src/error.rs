//! Error types for the generation pipeline

use thiserror::Error;

/// Result type alias using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

/// A request that cannot be processed as submitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No description provided")]
    MissingDescription,

    /// Modification requests need the description, HTML and CSS
    #[error("Missing required fields")]
    MissingFields,

    #[error("Description exceeds {limit} characters")]
    DescriptionTooLong { limit: usize },
}

/// Errors surfaced before a generation stream starts
///
/// Provider failures during topic extraction and image search are degraded
/// locally and never reach this type; failures after streaming begins are
/// reported in-band.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
