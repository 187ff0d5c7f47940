use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::core::chat_client::ChatClient;
use crate::core::completion::{CompletionError, CompletionService};
use crate::core::config::{Config, ConfigError, ConfigKey};
use crate::core::coordinator::Coordinator;

/// Process-wide session state: the active configuration and the coordinator
/// that owns the conversation.
pub struct App {
    pub coordinator: Coordinator,
    config: Config,
    config_path: Option<PathBuf>,
}

impl App {
    /// Builds an app backed by the HTTP completion client described by
    /// `config`. `model_override` wins over the configured model for this
    /// session only.
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        model_override: Option<String>,
    ) -> Result<Self, CompletionError> {
        let client = ChatClient::from_config(&config)?;
        let mut app = Self::with_service(config, config_path, Arc::new(client));
        if let Some(model) = model_override.filter(|m| !m.trim().is_empty()) {
            app.coordinator.set_model(model);
        }
        Ok(app)
    }

    pub fn with_service(
        config: Config,
        config_path: Option<PathBuf>,
        service: Arc<dyn CompletionService>,
    ) -> Self {
        let coordinator = Coordinator::new(service, config.resolved_model());
        Self {
            coordinator,
            config,
            config_path,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Updates one setting, persists it when the app has a config path, and
    /// applies it to later turns.
    pub fn update_config(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigUpdateError> {
        let mut updated = self.config.clone();
        updated.set(key, value);

        let client = match key {
            ConfigKey::ApiKey | ConfigKey::BaseUrl => Some(ChatClient::from_config(&updated)?),
            ConfigKey::Model => None,
        };

        if let Some(path) = &self.config_path {
            updated.save_to_path(path)?;
        }

        if let Some(client) = client {
            self.coordinator.set_service(Arc::new(client));
        }
        if key == ConfigKey::Model {
            self.coordinator.set_model(updated.resolved_model());
        }

        debug!(key = %key, "Configuration updated");
        self.config = updated;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigUpdateError {
    #[error(transparent)]
    Client(#[from] CompletionError),
    #[error(transparent)]
    Save(#[from] ConfigError),
}
