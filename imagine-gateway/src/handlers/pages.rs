use crate::config::SiteConfig;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

pub const INDEX_PAGE: &str = "index.html";
pub const IMAGINE_PAGE: &str = "imagine.html";
pub const CHAT_PAGE: &str = "chat.html";
pub const NOT_FOUND_PAGE: &str = "404.html";

/// 404 status with the not-found page, or plain text if the page is unreadable.
pub async fn not_found(State(state): State<AppState>) -> Response {
    not_found_response(&state.site).await
}

pub async fn not_found_response(site: &SiteConfig) -> Response {
    let path = site.pages_dir.join(NOT_FOUND_PAGE);
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Not-found page unavailable");
            (StatusCode::NOT_FOUND, "404 - Not Found").into_response()
        }
    }
}
