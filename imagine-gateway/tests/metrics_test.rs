mod common;

use common::TestApp;
use reqwest::StatusCode;

#[tokio::test]
async fn unknown_paths_share_one_metrics_series() {
    let app = TestApp::spawn().await;

    for i in 0..5 {
        let response = app.get(&format!("/scan-{}", i)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let body = app.get("/metrics").await.text().await.unwrap();

    assert!(!body.contains("scan-"), "raw paths leaked into labels:\n{}", body);
    assert!(body
        .lines()
        .any(|line| line.starts_with("http_requests_total") && line.contains("path=\"fallback\"")));
    assert!(body.contains("path=\"/health\""));
}
