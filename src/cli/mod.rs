//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod setup;

use std::error::Error;
use std::io;
use std::path::Path;

use clap::{Parser, Subcommand};

use crate::cli::setup::run_setup;
use crate::core::app::App;
use crate::core::config::{path_display, Config, ConfigKey};
use crate::logging::init_tracing;
use crate::ui::chat_loop::run_chat;
use crate::utils::auth::mask_api_key;

#[derive(Parser)]
#[command(name = "codeaid")]
#[command(about = "A terminal chat assistant for OpenRouter models")]
#[command(
    long_about = "codeaid is a line-oriented terminal chat assistant that sends your \
conversation to an OpenAI-compatible API (OpenRouter by default). One request is in \
flight at a time; sending a new message supersedes the pending one.\n\n\
Environment Variables:\n\
  OPENROUTER_API_KEY    API key used when none is configured\n\
  CODEAID_LOG           Diagnostic log filter written to stderr (e.g. codeaid=debug)\n\n\
Controls:\n\
  Enter                 Send the message\n\
  Ctrl+C                Cancel the pending request, or quit when idle\n\n\
Commands:\n\
  /help                 List chat commands\n\
  /clear                Clear conversation history\n\
  /config               Show or change configuration\n\
  /exit                 Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this session, overriding the configured one
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Interactively configure the API key and model
    Setup,
    /// Set a configuration value, or show all values when none is given
    Set {
        /// Configuration key: api-key, model or base-url
        key: String,
        /// Value to set (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key: api-key, model or base-url
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing();

    let config_path = Config::get_config_path()?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Setup => {
            let config = Config::load_from_path(&config_path)?;
            setup_and_save(config, &config_path)?;
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load_from_path(&config_path)?;
            let key = parse_key_or_exit(&key);
            let value = value.join(" ");
            if value.trim().is_empty() {
                config.print_all();
                return Ok(());
            }
            let shown = apply_set(&mut config, key, &value);
            config.save_to_path(&config_path)?;
            println!("✅ Set {key} to: {shown}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load_from_path(&config_path)?;
            let key = parse_key_or_exit(&key);
            config.unset(key);
            config.save_to_path(&config_path)?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Chat => {
            let mut config = Config::load_from_path(&config_path)?;
            if needs_first_time_setup(config_path.exists(), config.resolve_api_key()) {
                config = setup_and_save(config, &config_path)?;
            }

            let app = match App::new(config, Some(config_path), args.model) {
                Ok(app) => app,
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            };
            run_chat(app).await?;
            Ok(())
        }
    }
}

/// Setup runs on its own only when there is nothing to work with: no config
/// file and no key in the environment.
pub fn needs_first_time_setup(config_exists: bool, api_key: Option<String>) -> bool {
    !config_exists && api_key.is_none()
}

/// Applies `value` to `key` and returns the value as it should be echoed.
pub fn apply_set(config: &mut Config, key: ConfigKey, value: &str) -> String {
    config.set(key, value);
    let stored = config.get(key).unwrap_or_default();
    match key {
        ConfigKey::ApiKey => mask_api_key(stored),
        _ => stored.to_string(),
    }
}

fn parse_key_or_exit(key: &str) -> ConfigKey {
    match key.parse::<ConfigKey>() {
        Ok(key) => key,
        Err(message) => {
            eprintln!("❌ {message}");
            std::process::exit(1);
        }
    }
}

fn setup_and_save(config: Config, config_path: &Path) -> Result<Config, Box<dyn Error>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let config = run_setup(config, &mut stdin.lock(), &mut stdout)?;
    config.save_to_path(config_path)?;
    println!("\nConfiguration saved to {}\n", path_display(config_path));
    Ok(config)
}

#[cfg(test)]
mod tests;
