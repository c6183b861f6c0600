//! Built-in bot commands, parsed from prefixed messages and answered without a provider call.

mod admin;
mod translate;

#[cfg(test)]
mod tests;

use crate::state::AppState;
use parley_core::message::IncomingMessage;

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub state: &'a mut AppState,
    pub message: &'a IncomingMessage,
    /// Whitespace-separated tokens after the command name.
    pub args: &'a [&'a str],
}

/// Known bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Translate,
    Prefix,
    Roles,
    Locales,
}

impl Command {
    /// Look up a command by name. Names are case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "translate" => Some(Self::Translate),
            "prefix" => Some(Self::Prefix),
            "roles" => Some(Self::Roles),
            "locales" => Some(Self::Locales),
            _ => None,
        }
    }
}

/// A prefixed message split into command name and arguments.
#[derive(Debug, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub name: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> Invocation<'a> {
    /// Split `text` into an invocation if it starts with exactly `prefix`.
    pub fn parse(text: &'a str, prefix: &str) -> Option<Self> {
        if prefix.is_empty() {
            return None;
        }
        let rest = text.strip_prefix(prefix)?;
        let mut tokens = rest.split_whitespace();
        let name = tokens.next().unwrap_or("");
        Some(Self {
            name,
            args: tokens.collect(),
        })
    }
}

/// Handle a command and return the reply texts, in send order.
pub fn handle(cmd: Command, ctx: &mut CommandContext<'_>) -> Vec<String> {
    match cmd {
        Command::Translate => translate::handle_translate(ctx),
        Command::Prefix => admin::handle_prefix(ctx),
        Command::Roles => admin::handle_roles(ctx),
        Command::Locales => vec![translate::handle_locales(ctx)],
    }
}

/// Reply for a name that matches no command.
pub fn unknown_command(name: &str) -> String {
    format!("Command `{name}` does not exist.")
}

fn invalid_argument(arg: &str) -> String {
    format!("Invalid argument `{arg}`")
}
