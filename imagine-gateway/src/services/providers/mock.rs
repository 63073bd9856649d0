//! Scripted image provider for testing.

use super::{ImageProvider, ImageRequest, ProviderError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Outcome of one scripted call.
#[derive(Debug, Clone)]
pub struct MockOutcome {
    pub result: Result<String, ProviderError>,
    pub delay: Duration,
}

impl MockOutcome {
    pub fn ok(payload: impl Into<String>) -> Self {
        Self {
            result: Ok(payload.into()),
            delay: Duration::ZERO,
        }
    }

    pub fn err(error: ProviderError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Mock provider that answers calls from a script, in call order.
///
/// Once the script is exhausted every call succeeds with `"mock-image"`.
/// Every request is recorded so tests can assert on what was dispatched.
#[derive(Default)]
pub struct MockImageProvider {
    script: Mutex<VecDeque<MockOutcome>>,
    calls: Mutex<Vec<ImageRequest>>,
}

impl MockImageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in the order calls started.
    pub fn calls(&self) -> Vec<ImageRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate(&self, request: &ImageRequest) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        let outcome = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| MockOutcome::ok("mock-image"));

        if !outcome.delay.is_zero() {
            tokio::time::sleep(outcome.delay).await;
        }

        outcome.result
    }
}
