//! Generation requests and their validation

use crate::constants::limits;
use crate::error::ValidationError;

/// Which template family a request uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    WebsiteCreate,
    WebsiteModify,
    ApplicationCreate,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::WebsiteCreate => "website-create",
            RequestKind::WebsiteModify => "website-modify",
            RequestKind::ApplicationCreate => "application-create",
        }
    }
}

/// The code of the site being modified, embedded verbatim in the prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentSite {
    pub html: String,
    pub css: String,
    pub js: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    WebsiteCreate {
        description: String,
    },
    WebsiteModify {
        description: String,
        current: CurrentSite,
    },
    ApplicationCreate {
        description: String,
    },
}

impl GenerationRequest {
    pub fn website(description: impl Into<String>) -> Self {
        Self::WebsiteCreate {
            description: description.into(),
        }
    }

    pub fn application(description: impl Into<String>) -> Self {
        Self::ApplicationCreate {
            description: description.into(),
        }
    }

    /// Modification of an existing site; missing JavaScript means none
    pub fn modification(
        description: impl Into<String>,
        html: impl Into<String>,
        css: impl Into<String>,
        js: Option<String>,
    ) -> Self {
        Self::WebsiteModify {
            description: description.into(),
            current: CurrentSite {
                html: html.into(),
                css: css.into(),
                js: js.unwrap_or_default(),
            },
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Self::WebsiteCreate { .. } => RequestKind::WebsiteCreate,
            Self::WebsiteModify { .. } => RequestKind::WebsiteModify,
            Self::ApplicationCreate { .. } => RequestKind::ApplicationCreate,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::WebsiteCreate { description }
            | Self::WebsiteModify { description, .. }
            | Self::ApplicationCreate { description } => description,
        }
    }

    pub fn validate(&self, limits: &RequestLimits) -> Result<(), ValidationError> {
        match self {
            Self::WebsiteModify {
                description,
                current,
            } => {
                if is_blank(description) || is_blank(&current.html) || is_blank(&current.css) {
                    return Err(ValidationError::MissingFields);
                }
            }
            Self::WebsiteCreate { description } | Self::ApplicationCreate { description } => {
                if is_blank(description) {
                    return Err(ValidationError::MissingDescription);
                }
            }
        }

        if self.description().chars().count() > limits.max_description_chars {
            return Err(ValidationError::DescriptionTooLong {
                limit: limits.max_description_chars,
            });
        }
        Ok(())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Bounds applied to incoming requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_description_chars: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_description_chars: limits::MAX_DESCRIPTION_CHARS,
        }
    }
}
