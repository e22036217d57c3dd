use std::sync::Arc;

use crate::config::AgentConfig;

/// Shared state for token server handlers
#[derive(Debug)]
pub struct AppState {
    pub config: AgentConfig,
}

impl AppState {
    pub fn new(config: AgentConfig) -> Arc<Self> {
        Arc::new(Self { config })
    }
}
