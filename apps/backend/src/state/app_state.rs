use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::hub::GameRegistry;

/// Shared across all workers; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<GameRegistry>,
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(GameRegistry::from_config(&config));
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: ServerConfig, registry: Arc<GameRegistry>) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> Arc<GameRegistry> {
        self.registry.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
