//! Image generation provider abstraction.
//!
//! The orchestrator only sees [`ImageProvider`], so the HTTP-backed provider
//! can be swapped for the scripted mock in tests.

pub mod creart;
pub mod mock;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NetworkError(_) => "network",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::ApiError { .. } => "api",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else {
            ProviderError::NetworkError(err.to_string())
        }
    }
}

/// Image shape requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    Square,
    Widescreen,
}

impl AspectRatio {
    /// Wire value expected by the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1x1",
            AspectRatio::Widescreen => "16x9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    /// Inbound `x-request-id`, forwarded to the provider.
    pub request_id: Option<String>,
}

/// Trait for text-to-image providers.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate one image and return its base64-encoded JPEG payload.
    async fn generate(&self, request: &ImageRequest) -> Result<String, ProviderError>;
}
