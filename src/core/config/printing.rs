use crate::core::config::data::{Config, ConfigKey};
use crate::utils::auth::mask_api_key;

impl Config {
    /// One `key: value` line per setting, with the API key masked.
    pub fn summary_lines(&self) -> Vec<String> {
        ConfigKey::ALL
            .iter()
            .map(|&key| {
                let value = match (key, self.get(key)) {
                    (_, None) => "(unset)".to_string(),
                    (ConfigKey::ApiKey, Some(api_key)) => mask_api_key(api_key),
                    (_, Some(value)) => value.to_string(),
                };
                format!("{key}: {value}")
            })
            .collect()
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.summary_lines() {
            println!("  {line}");
        }
    }
}
