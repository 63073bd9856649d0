//! Image request orchestration.
//!
//! A prompt is validated, checked against the denylist, then sent to the
//! provider three times concurrently (square, square, widescreen). The
//! request succeeds only if all three calls do.

use super::denylist::Denylist;
use super::providers::{AspectRatio, ImageProvider, ImageRequest, ProviderError};
use crate::config::VerbosityMode;
use axum::http::StatusCode;
use futures::future::join_all;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

/// Aspect ratios dispatched per request; the response keeps this order.
pub const DISPATCH_PLAN: [AspectRatio; 3] = [
    AspectRatio::Square,
    AspectRatio::Square,
    AspectRatio::Widescreen,
];

pub const INVALID_PROMPT_MESSAGE: &str = "Please provide a valid prompt.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate images. Please try again later.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImagineError {
    #[error("{}", INVALID_PROMPT_MESSAGE)]
    InvalidPrompt,

    #[error("Sorry, but you are not allowed to use the word \"{0}\".")]
    BannedWord(String),

    #[error("{0}")]
    UpstreamFailure(ProviderError),
}

impl ImagineError {
    pub fn status(&self) -> StatusCode {
        match self {
            ImagineError::InvalidPrompt | ImagineError::BannedWord(_) => StatusCode::BAD_REQUEST,
            ImagineError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the caller. Upstream detail is only exposed in verbose mode.
    pub fn client_message(&self, verbosity: VerbosityMode) -> String {
        match (self, verbosity) {
            (ImagineError::UpstreamFailure(err), VerbosityMode::Verbose) => err.to_string(),
            (ImagineError::UpstreamFailure(_), VerbosityMode::Generic) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            _ => self.to_string(),
        }
    }

    pub fn into_app_error(self, verbosity: VerbosityMode) -> AppError {
        let message = self.client_message(verbosity);
        match self {
            ImagineError::InvalidPrompt | ImagineError::BannedWord(_) => {
                AppError::BadRequest(anyhow::anyhow!(message))
            }
            ImagineError::UpstreamFailure(_) => AppError::UpstreamFailure(message),
        }
    }
}

pub struct ImageOrchestrator {
    provider: Arc<dyn ImageProvider>,
    denylist: Denylist,
}

impl ImageOrchestrator {
    pub fn new(provider: Arc<dyn ImageProvider>, denylist: Denylist) -> Self {
        Self { provider, denylist }
    }

    /// Validate `prompt` and generate the three images as data URIs.
    ///
    /// `request_id` is attached to every provider call.
    pub async fn handle(
        &self,
        prompt: Option<&str>,
        request_id: Option<&str>,
    ) -> Result<Vec<String>, ImagineError> {
        let prompt = match prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(ImagineError::InvalidPrompt),
        };

        // The raw prompt is both checked and forwarded; trimming only decides emptiness.
        if let Some(word) = self.denylist.find(prompt) {
            tracing::debug!(word = %word, "Prompt rejected by denylist");
            return Err(ImagineError::BannedWord(word.to_string()));
        }

        let requests: Vec<ImageRequest> = DISPATCH_PLAN
            .iter()
            .map(|&aspect_ratio| ImageRequest {
                prompt: prompt.to_string(),
                aspect_ratio,
                request_id: request_id.map(str::to_string),
            })
            .collect();

        // All calls settle before the outcome is decided; results come back in dispatch order.
        let results = join_all(requests.iter().map(|req| self.provider.generate(req))).await;

        let mut images = Vec::with_capacity(results.len());
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(payload) => images.push(to_data_uri(&payload)),
                Err(e) => {
                    tracing::error!(
                        aspect_ratio = %request.aspect_ratio,
                        error = %e,
                        "Image generation error"
                    );
                    return Err(ImagineError::UpstreamFailure(e));
                }
            }
        }

        tracing::info!(images = images.len(), "Generated images");
        Ok(images)
    }
}

pub fn to_data_uri(payload: &str) -> String {
    format!("data:image/jpeg;base64,{}", payload)
}
