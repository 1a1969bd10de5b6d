//! Local slash commands.
//!
//! Only the names in the registry are handled locally. Any other input,
//! including unknown `/words`, is sent to the room as a chat message so the
//! server can interpret its own commands.

mod registry;

pub use registry::{all_commands, CommandInvocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    ProcessAsMessage(String),
    ShowHelp,
    RefreshUsers,
    ClearTranscript,
    Quit,
}

pub fn process_input(input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(trimmed.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(trimmed.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        (command.handler)(invocation)
    } else {
        CommandResult::ProcessAsMessage(trimmed.to_string())
    }
}

/// Lines shown by `/help`.
pub fn help_lines() -> Vec<String> {
    let mut lines = vec!["Commands:".to_string()];
    for command in all_commands() {
        lines.push(format!("  /{:<8} {}", command.name, command.help));
    }
    lines.push("Keys:".to_string());
    lines.push("  Enter     send the message".to_string());
    lines.push("  Up/Down   browse previously sent lines".to_string());
    lines.push("  PgUp/PgDn scroll the transcript".to_string());
    lines.push("  Ctrl+C    quit".to_string());
    lines
}

pub(super) fn handle_help(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::ShowHelp
}

pub(super) fn handle_users(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::RefreshUsers
}

pub(super) fn handle_clear(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::ClearTranscript
}

pub(super) fn handle_quit(invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        CommandResult::Quit
    } else {
        // `/quit now` is not ours; let the server decide.
        CommandResult::ProcessAsMessage(invocation.input.to_string())
    }
}
