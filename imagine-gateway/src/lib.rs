pub mod config;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod startup;

use config::{SiteConfig, VerbosityMode};
use services::{ChatClient, ImageOrchestrator};
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ImageOrchestrator>,
    pub chat_client: Arc<ChatClient>,
    pub verbosity: VerbosityMode,
    pub site: Arc<SiteConfig>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<ImageOrchestrator>,
        chat_client: Arc<ChatClient>,
        verbosity: VerbosityMode,
        site: SiteConfig,
    ) -> Self {
        Self {
            orchestrator,
            chat_client,
            verbosity,
            site: Arc::new(site),
        }
    }
}
