#![allow(dead_code)]

use imagine_gateway::config::{GatewayConfig, VerbosityMode};
use imagine_gateway::startup::Application;
use std::path::PathBuf;
use std::time::Duration;
use wiremock::MockServer;

pub const IMAGE_PATH: &str = "/api/v1/text2image";
pub const CHAT_PATH: &str = "/v1/openai/chat/completions";

pub fn crate_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

/// Configuration pointing both providers at `upstream`, on a random port.
pub fn test_config(upstream: &MockServer, verbosity: VerbosityMode) -> GatewayConfig {
    let mut config = GatewayConfig::load().expect("Failed to load configuration");
    config.common.port = 0;
    config.verbosity = verbosity;
    config.denylist = vec!["subash".to_string(), "baniya".to_string()];
    config.image_provider.url = format!("{}{}", upstream.uri(), IMAGE_PATH);
    config.image_provider.timeout = Duration::from_secs(5);
    config.chat_provider.url = format!("{}{}", upstream.uri(), CHAT_PATH);
    config.chat_provider.timeout = Duration::from_secs(5);
    config.site.pages_dir = crate_path("pages");
    config.site.public_dir = crate_path("public");
    config
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub upstream: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(VerbosityMode::Generic).await
    }

    pub async fn spawn_with(verbosity: VerbosityMode) -> Self {
        let upstream = MockServer::start().await;
        let config = test_config(&upstream, verbosity);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to answer its health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            upstream,
            client,
        }
    }

    pub async fn get(&self, path_and_query: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path_and_query))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn imagine(&self, prompt: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/api/imagine", self.address))
            .query(&[("prompt", prompt)])
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .expect("Failed to send request")
    }
}
