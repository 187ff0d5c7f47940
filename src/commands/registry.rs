use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

/// Exact, case-sensitive lookup. `name` includes the leading slash.
pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| command.name == name)
}

/// Sorted names of the commands starting with `prefix`, which must itself
/// start with a slash.
pub fn matching_commands(prefix: &str) -> Vec<&'static str> {
    if !prefix.starts_with('/') {
        return Vec::new();
    }

    let mut names: Vec<_> = all_commands()
        .iter()
        .map(|command| command.name)
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort_unstable();
    names
}

const COMMANDS: &[Command] = &[
    Command {
        name: "/clear",
        help: "Clear conversation history",
        handler: super::handle_clear,
    },
    Command {
        name: "/config",
        help: "Show settings, or change one with /config <api-key|model|base-url> <value>",
        handler: super::handle_config,
    },
    Command {
        name: "/exit",
        help: "Exit the application",
        handler: super::handle_exit,
    },
    Command {
        name: "/help",
        help: "Show available commands",
        handler: super::handle_help,
    },
];
