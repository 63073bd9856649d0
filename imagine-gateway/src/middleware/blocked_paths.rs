use crate::handlers::pages::not_found_response;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Answer 404 for sensitive paths before any route or static file sees them.
pub async fn block_sensitive_paths(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if is_blocked(&normalize_path(path), &state.site.blocked_paths) {
        tracing::warn!(path = %path, "Blocked request for sensitive path");
        return not_found_response(&state.site).await;
    }

    next.run(req).await
}

/// `path` must already be normalized with [`normalize_path`].
pub fn is_blocked(path: &str, blocked: &[String]) -> bool {
    blocked.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

/// Resolve a request path the way the static file service will: percent-decode,
/// drop empty and `.` segments, and apply `..`.
pub fn normalize_path(raw: &str) -> String {
    let decoded = urlencoding::decode_binary(raw.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked() -> Vec<String> {
        ["/.env", "/Cargo.toml", "/public/quotes.json", "/target"]
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    #[test]
    fn prefixes_are_blocked() {
        let blocked = blocked();
        assert!(is_blocked("/.env", &blocked));
        assert!(is_blocked("/.env.local", &blocked));
        assert!(is_blocked("/public/quotes.json", &blocked));
        assert!(is_blocked("/target/debug/imagine-gateway", &blocked));
    }

    #[test]
    fn encoded_and_dotted_paths_are_normalized() {
        assert_eq!(normalize_path("/%71uotes.json"), "/quotes.json");
        assert_eq!(normalize_path("/public/%71uotes.json"), "/public/quotes.json");
        assert_eq!(normalize_path("/public//quotes.json"), "/public/quotes.json");
        assert_eq!(normalize_path("/./quotes.json"), "/quotes.json");
        assert_eq!(normalize_path("/public/../.env"), "/.env");
        assert_eq!(normalize_path("/%2E%65nv"), "/.env");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn normalized_bypasses_are_blocked() {
        let blocked = blocked();
        for raw in ["/public/%71uotes.json", "//.env", "/./Cargo.toml", "/public/./quotes.json"] {
            assert!(is_blocked(&normalize_path(raw), &blocked), "{}", raw);
        }
    }

    #[test]
    fn other_paths_pass() {
        let blocked = blocked();
        assert!(!is_blocked("/", &blocked));
        assert!(!is_blocked("/public/style.css", &blocked));
        assert!(!is_blocked("/api/imagine", &blocked));
    }
}
