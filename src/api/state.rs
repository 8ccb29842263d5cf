//! Application State
//!
//! Shared state accessible by all API handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::completion::CompletionBackend;
use crate::config::RelayConfig;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Completion backend the chat route forwards to
    pub backend: Arc<dyn CompletionBackend>,
    /// Relay configuration
    pub config: Arc<RelayConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: RelayConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
