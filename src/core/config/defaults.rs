use std::path::Path;

use crate::core::config::data::Config;

pub const DEFAULT_MODEL: &str = "mistralai/mistral-small-3.1-24b-instruct:free";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
/// Read from the working directory when the environment lacks a key.
pub const DOTENV_FILE: &str = ".env";

/// Models offered during interactive setup.
pub const SUGGESTED_MODELS: &[&str] = &[
    "mistralai/mistral-small-3.1-24b-instruct:free",
    "anthropic/claude-3-haiku-20240307",
    "anthropic/claude-3-sonnet-20240229",
    "anthropic/claude-3-opus-20240229",
    "meta-llama/llama-3-8b-instruct",
    "meta-llama/llama-3-70b-instruct",
];

impl Config {
    pub fn resolved_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn resolved_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// The configured API key, or `OPENROUTER_API_KEY` from the environment
    /// or a `.env` file when the config has none. The process environment
    /// wins over `.env`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .or_else(|| dotenv_value(Path::new(DOTENV_FILE), name))
        })
    }

    pub fn resolve_api_key_with<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| env(API_KEY_ENV).filter(|key| !key.trim().is_empty()))
    }
}

/// Looks up `name` in a dotenv file without touching the process
/// environment. A missing or unreadable file yields `None`.
pub fn dotenv_value(path: &Path, name: &str) -> Option<String> {
    let entries = dotenvy::from_path_iter(path).ok()?;
    entries
        .filter_map(Result::ok)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}
