use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// OpenRouter API key. Falls back to `OPENROUTER_API_KEY` when unset.
    pub api_key: Option<String>,
    /// Model identifier sent with every completion request
    pub model: Option<String>,
    /// Base URL of an OpenAI-compatible API (defaults to OpenRouter)
    pub base_url: Option<String>,
}

/// Settable configuration keys, as spelled on the command line and in
/// `/config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiKey,
    Model,
    BaseUrl,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [ConfigKey::ApiKey, ConfigKey::Model, ConfigKey::BaseUrl];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "api-key",
            ConfigKey::Model => "model",
            ConfigKey::BaseUrl => "base-url",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api-key" | "key" => Ok(ConfigKey::ApiKey),
            "model" => Ok(ConfigKey::Model),
            "base-url" => Ok(ConfigKey::BaseUrl),
            other => Err(format!(
                "Unknown config key: {other} (expected one of: api-key, model, base-url)"
            )),
        }
    }
}

impl Config {
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        let value = value.into();
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        *self.slot(key) = value;
    }

    pub fn unset(&mut self, key: ConfigKey) {
        *self.slot(key) = None;
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::ApiKey => self.api_key.as_deref(),
            ConfigKey::Model => self.model.as_deref(),
            ConfigKey::BaseUrl => self.base_url.as_deref(),
        }
    }

    fn slot(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::ApiKey => &mut self.api_key,
            ConfigKey::Model => &mut self.model,
            ConfigKey::BaseUrl => &mut self.base_url,
        }
    }
}

/// Format a path for display, replacing the home directory with `~` on
/// Unix-like systems.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
