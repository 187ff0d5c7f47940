//! Slash-command classification and the built-in command handlers.
//!
//! [`dispatch`] is a pure classifier: it decides whether a line of input runs
//! a registered command or goes to the model. A slash-prefixed line whose
//! name is not registered is sent to the model verbatim.

mod registry;

pub use registry::{all_commands, find_command, matching_commands, Command, CommandInvocation};

use crate::core::app::App;
use crate::core::config::{path_display, ConfigKey};
use crate::utils::auth::mask_api_key;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RunCommand { name: String, args: String },
    SendToModel(String),
}

/// The single outcome of running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    HistoryCleared,
    Message(String),
    Exit,
}

pub fn dispatch(input: &str) -> Action {
    classify(input, |name| find_command(name).is_some())
}

/// Classifies `input` against an arbitrary registry lookup.
pub fn classify(input: &str, is_registered: impl Fn(&str) -> bool) -> Action {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Action::SendToModel(trimmed.to_string());
    }

    let (name, args) = match trimmed.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (trimmed, ""),
    };

    if is_registered(name) {
        Action::RunCommand {
            name: name.to_string(),
            args: args.to_string(),
        }
    } else {
        Action::SendToModel(input.to_string())
    }
}

pub fn run_command(app: &mut App, name: &str, args: &str) -> CommandResult {
    match find_command(name) {
        Some(command) => (command.handler)(app, CommandInvocation { name, args }),
        None => CommandResult::Message(format!("Unknown command: {name}")),
    }
}

pub(super) fn handle_clear(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.coordinator.clear_history();
    CommandResult::HistoryCleared
}

pub(super) fn handle_exit(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Exit
}

pub(super) fn handle_help(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut commands: Vec<&Command> = all_commands().iter().collect();
    commands.sort_by_key(|command| command.name);

    let mut help = String::from("Available commands:\n");
    for command in commands {
        help.push_str(&format!("{} - {}\n", command.name, command.help));
    }
    CommandResult::Message(help)
}

pub(super) fn handle_config(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        let location = app
            .config_path()
            .map(path_display)
            .unwrap_or_else(|| "not saved".to_string());
        let mut text = format!("Configuration ({location}):\n");
        for line in app.config().summary_lines() {
            text.push_str(&format!("  {line}\n"));
        }
        text.push_str(&format!("  active model: {}\n", app.coordinator.model()));
        return CommandResult::Message(text);
    }

    let usage = "Usage: /config [<api-key|model|base-url> <value>]";
    let Some((key, value)) = invocation.args.split_once(char::is_whitespace) else {
        return CommandResult::Message(usage.to_string());
    };
    let key = match key.parse::<ConfigKey>() {
        Ok(key) => key,
        Err(message) => return CommandResult::Message(format!("{message}\n{usage}")),
    };
    let value = value.trim();

    match app.update_config(key, value) {
        Ok(()) => {
            let shown = match key {
                ConfigKey::ApiKey => mask_api_key(value),
                _ => value.to_string(),
            };
            CommandResult::Message(format!("Set {key} to: {shown}"))
        }
        Err(err) => CommandResult::Message(format!("Config error: {err}")),
    }
}

#[cfg(test)]
mod tests;
