//! Interactive configuration prompt, run on first launch or via `codeaid setup`.

use std::io::{self, BufRead, Write};

use crate::core::config::defaults::SUGGESTED_MODELS;
use crate::core::config::{Config, ConfigKey};
use crate::utils::auth::mask_api_key;

/// Walks the user through the API key and model, starting from `config`.
/// Empty answers keep the current value. The caller persists the result.
pub fn run_setup<R: BufRead, W: Write>(
    mut config: Config,
    input: &mut R,
    output: &mut W,
) -> io::Result<Config> {
    writeln!(output)?;
    writeln!(output, "codeaid configuration")?;
    writeln!(output, "{}", "=".repeat(50))?;
    writeln!(output, "Press Enter to keep the current value.")?;

    if let Some(key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
        writeln!(output, "Current OpenRouter API key: {}", mask_api_key(key))?;
    }
    let api_key = prompt(input, output, "OpenRouter API key: ")?;
    if !api_key.is_empty() {
        config.set(ConfigKey::ApiKey, api_key);
    }

    writeln!(output)?;
    writeln!(output, "Model selection:")?;
    writeln!(output, "Current model: {}", config.resolved_model())?;
    writeln!(output)?;
    for (index, model) in SUGGESTED_MODELS.iter().enumerate() {
        writeln!(output, "{}) {model}", index + 1)?;
    }
    let custom_choice = SUGGESTED_MODELS.len() + 1;
    writeln!(output, "{custom_choice}) Custom model")?;

    let choice = prompt(
        input,
        output,
        &format!("\nSelect model (1-{custom_choice}): "),
    )?;
    match choice.parse::<usize>() {
        Ok(n) if n == custom_choice => {
            let custom = prompt(input, output, "Enter custom model identifier: ")?;
            if !custom.is_empty() {
                config.set(ConfigKey::Model, custom);
            }
        }
        Ok(n) if (1..=SUGGESTED_MODELS.len()).contains(&n) => {
            config.set(ConfigKey::Model, SUGGESTED_MODELS[n - 1]);
        }
        _ if choice.is_empty() => {}
        _ => writeln!(output, "Unrecognized choice; keeping {}", config.resolved_model())?,
    }

    Ok(config)
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<String> {
    write!(output, "{label}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
