//! Chat-completion relay.
//!
//! Wraps the user's prompt in a fixed system persona, forwards it to an
//! OpenAI-compatible endpoint, and hands back the provider's JSON untouched.

use crate::config::{ChatProviderConfig, VerbosityMode};
use reqwest::Client;
use serde::Serialize;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use thiserror::Error;

pub const SYSTEM_PROMPT: &str =
    "You are a friendly AI Assistant, providing short, human-like, and engaging responses.";
pub const MISSING_PROMPT_MESSAGE: &str = "The 'prompt' query parameter is required.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Chat request failed";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("The 'prompt' query parameter is required.")]
    MissingPrompt,

    #[error("Chat provider unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Chat provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Chat provider returned invalid JSON: {0}")]
    InvalidResponse(String),
}

impl ChatError {
    pub fn into_app_error(self, verbosity: VerbosityMode) -> AppError {
        match self {
            ChatError::MissingPrompt => AppError::BadRequest(anyhow::anyhow!(MISSING_PROMPT_MESSAGE)),
            other => AppError::UpstreamFailure(match verbosity {
                VerbosityMode::Verbose => other.to_string(),
                VerbosityMode::Generic => GENERIC_FAILURE_MESSAGE.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

pub struct ChatClient {
    client: Client,
    settings: ChatProviderConfig,
}

impl ChatClient {
    pub fn new(settings: ChatProviderConfig) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Send `prompt` as the user turn and return the provider's JSON body.
    pub async fn complete(
        &self,
        prompt: Option<&str>,
        request_id: Option<&str>,
    ) -> Result<serde_json::Value, ChatError> {
        let prompt = match prompt {
            Some(p) if !p.is_empty() => p,
            _ => return Err(ChatError::MissingPrompt),
        };

        let body = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .traced_post(&self.settings.url)
            .header("accept", "application/json")
            .header("x-deepinfra-source", "web-embed")
            .header("Referer", "https://deepinfra.com/")
            .json(&body)
            .send_with_request_id(request_id)
            .await
            .map_err(|e| {
                tracing::error!(url = %self.settings.url, error = %e, "Chat request failed to send");
                ChatError::Network(e)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, "Chat provider returned an error status");
            return Err(ChatError::Api { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))
    }
}
