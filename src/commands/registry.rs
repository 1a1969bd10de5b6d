use super::CommandResult;

pub type CommandHandler = fn(CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        help: "Show available commands and key bindings.",
        handler: super::handle_help,
    },
    Command {
        name: "users",
        help: "Refresh the user list from the server.",
        handler: super::handle_users,
    },
    Command {
        name: "clear",
        help: "Clear the transcript.",
        handler: super::handle_clear,
    },
    Command {
        name: "quit",
        help: "Close the connection and exit.",
        handler: super::handle_quit,
    },
];
