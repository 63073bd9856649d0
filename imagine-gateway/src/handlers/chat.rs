use super::PromptParams;
use crate::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use service_core::error::AppError;
use service_core::observability::extract_request_id;

/// `GET /api/chat?prompt=` - relays the chat provider's JSON as-is.
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: PromptParams,
) -> Result<Json<serde_json::Value>, AppError> {
    let request_id = extract_request_id(&headers);

    state
        .chat_client
        .complete(params.prompt.as_deref(), request_id.as_deref())
        .await
        .map(Json)
        .map_err(|e| e.into_app_error(state.verbosity))
}
