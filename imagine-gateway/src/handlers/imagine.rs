use super::PromptParams;
use crate::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use metrics::counter;
use serde::Serialize;
use service_core::error::AppError;
use service_core::observability::extract_request_id;

#[derive(Debug, Serialize)]
pub struct ImagineResponse {
    pub images: Vec<String>,
}

/// `GET /api/imagine?prompt=` - three generated images as data URIs.
pub async fn imagine(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: PromptParams,
) -> Result<Json<ImagineResponse>, AppError> {
    let request_id = extract_request_id(&headers);

    match state
        .orchestrator
        .handle(params.prompt.as_deref(), request_id.as_deref())
        .await
    {
        Ok(images) => {
            counter!("imagine_requests_total", "outcome" => "success").increment(1);
            Ok(Json(ImagineResponse { images }))
        }
        Err(e) => {
            let outcome = if e.status().is_client_error() {
                "rejected"
            } else {
                "upstream_failure"
            };
            counter!("imagine_requests_total", "outcome" => outcome).increment(1);
            Err(e.into_app_error(state.verbosity))
        }
    }
}
