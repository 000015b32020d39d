use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
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
        usage: "/help",
        help: "Show available commands and usage information.",
        handler: super::handle_help,
    },
    Command {
        name: "characters",
        usage: "/characters",
        help: "Re-fetch the character directory and list it.",
        handler: super::handle_characters,
    },
    Command {
        name: "switch",
        usage: "/switch <id>",
        help: "Switch the conversation to another character.",
        handler: super::handle_switch,
    },
    Command {
        name: "show",
        usage: "/show <id>",
        help: "Show the full profile of a character.",
        handler: super::handle_show,
    },
    Command {
        name: "delete",
        usage: "/delete <id>",
        help: "Delete a character (asks for confirmation).",
        handler: super::handle_delete,
    },
    Command {
        name: "conversations",
        usage: "/conversations",
        help: "List stored conversations from the server log.",
        handler: super::handle_conversations,
    },
    Command {
        name: "log",
        usage: "/log [file]",
        help: "Toggle transcript logging or set the log file path.",
        handler: super::handle_log,
    },
];
