//! Creart text-to-image provider.
//!
//! Form-encoded POST; the response carries the JPEG as base64 under
//! `image_base64`.

use super::{ImageProvider, ImageRequest, ProviderError};
use crate::config::ImageProviderConfig;
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::time::Instant;

/// Attributes the generator is steered away from.
pub const NEGATIVE_PROMPT: &str = ",malformed hands,malformed fingers,malformed faces,malformed body parts,mutated body parts,malformed eyes,mutated fingers,mutated hands,realistic,worst quality, low quality, blurry, pixelated, extra limb, extra fingers, bad hand, text, name, letters, out of frame, lowres, text, error, cropped, jpeg artifacts, ugly, duplicate, morbid, mutilated, out of frame, poorly drawn hands, poorly drawn face, mutation, deformed, dehydrated, bad anatomy, bad proportions, cloned face, disfigured, gross proportions, malformed limbs, missing arms, missing legs, fused fingers, too many fingers, long neck, username,";

pub const CONTROLNET_CONDITIONING_SCALE: f32 = 0.5;
pub const GUIDANCE_SCALE: f32 = 5.5;

pub struct CreartImageProvider {
    url: String,
    client: Client,
}

impl CreartImageProvider {
    pub fn new(config: &ImageProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.clone(),
            client,
        })
    }

    async fn call(&self, request: &ImageRequest) -> Result<String, ProviderError> {
        let form = Text2ImageForm {
            prompt: &request.prompt,
            negative_prompt: NEGATIVE_PROMPT,
            aspect_ratio: request.aspect_ratio.as_str(),
            controlnet_conditioning_scale: CONTROLNET_CONDITIONING_SCALE,
            guidance_scale: GUIDANCE_SCALE,
        };

        let response = self
            .client
            .traced_post(&self.url)
            .form(&form)
            .send_with_request_id(request.request_id.as_deref())
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body: Text2ImageResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        match body.image_base64 {
            Some(image) if !image.is_empty() => Ok(image),
            _ => Err(ProviderError::InvalidResponse(
                "Response has no image_base64 payload".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ImageProvider for CreartImageProvider {
    async fn generate(&self, request: &ImageRequest) -> Result<String, ProviderError> {
        tracing::debug!(
            aspect_ratio = %request.aspect_ratio,
            prompt_len = request.prompt.len(),
            "Sending text2image request"
        );

        let start = Instant::now();
        let result = self.call(request).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };

        let labels = [
            ("aspect_ratio", request.aspect_ratio.as_str().to_string()),
            ("outcome", outcome.to_string()),
        ];
        counter!("image_provider_requests_total", &labels).increment(1);
        histogram!("image_provider_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        result
    }
}

#[derive(Debug, Serialize)]
struct Text2ImageForm<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    aspect_ratio: &'a str,
    controlnet_conditioning_scale: f32,
    guidance_scale: f32,
}

#[derive(Debug, Deserialize)]
struct Text2ImageResponse {
    #[serde(default)]
    image_base64: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::AspectRatio;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> CreartImageProvider {
        CreartImageProvider::new(&ImageProviderConfig {
            url: format!("{}/api/v1/text2image", server.uri()),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    fn request(aspect_ratio: AspectRatio) -> ImageRequest {
        ImageRequest {
            prompt: "a cat".to_string(),
            aspect_ratio,
            request_id: None,
        }
    }

    #[tokio::test]
    async fn sends_form_fields_and_returns_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/text2image"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("prompt=a+cat"))
            .and(body_string_contains("aspect_ratio=16x9"))
            .and(body_string_contains("controlnet_conditioning_scale=0.5"))
            .and(body_string_contains("guidance_scale=5.5"))
            .and(body_string_contains("negative_prompt=%2Cmalformed+hands"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "image_base64": "QUJD" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let image = provider(&server)
            .generate(&request(AspectRatio::Widescreen))
            .await
            .unwrap();

        assert_eq!(image, "QUJD");
    }

    #[tokio::test]
    async fn forwards_request_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-request-id", "req-42"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "image_base64": "QUJD" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let image = provider(&server)
            .generate(&ImageRequest {
                request_id: Some("req-42".to_string()),
                ..request(AspectRatio::Square)
            })
            .await
            .unwrap();

        assert_eq!(image, "QUJD");
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&request(AspectRatio::Square))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ProviderError::ApiError {
                status: 503,
                body: "overloaded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn missing_payload_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&request(AspectRatio::Square))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&request(AspectRatio::Square))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "image_base64": "QUJD" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider = CreartImageProvider::new(&ImageProviderConfig {
            url: server.uri(),
            timeout: Duration::from_millis(50),
        })
        .unwrap();

        let err = provider
            .generate(&request(AspectRatio::Square))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Timeout(_)));
    }
}
