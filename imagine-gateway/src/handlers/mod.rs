pub mod chat;
pub mod health;
pub mod imagine;
pub mod pages;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use service_core::error::AppError;

/// `?prompt=` query shared by the API endpoints.
///
/// Repeated keys are tolerated and the first `prompt` wins. Rejections use
/// the JSON error body like every other API failure.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PromptParams {
    pub prompt: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for PromptParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))?;

        let prompt = pairs
            .into_iter()
            .find(|(key, _)| key == "prompt")
            .map(|(_, value)| value);

        Ok(Self { prompt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(uri: &str) -> PromptParams {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        PromptParams::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn reads_the_prompt() {
        assert_eq!(extract("/api/imagine?prompt=a%20cat").await.prompt.as_deref(), Some("a cat"));
        assert_eq!(extract("/api/imagine?prompt=a+cat").await.prompt.as_deref(), Some("a cat"));
    }

    #[tokio::test]
    async fn missing_prompt_is_none() {
        assert_eq!(extract("/api/imagine").await, PromptParams::default());
        assert_eq!(extract("/api/imagine?other=1").await, PromptParams::default());
    }

    #[tokio::test]
    async fn first_repeated_prompt_wins() {
        assert_eq!(extract("/api/chat?prompt=a&prompt=b").await.prompt.as_deref(), Some("a"));
    }
}
