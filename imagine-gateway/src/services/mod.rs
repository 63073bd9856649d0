pub mod chat;
pub mod denylist;
pub mod metrics;
pub mod orchestrator;
pub mod providers;

pub use chat::ChatClient;
pub use denylist::Denylist;
pub use orchestrator::{ImageOrchestrator, ImagineError};
