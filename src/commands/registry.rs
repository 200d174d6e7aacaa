use super::InputCommand;

pub type CommandParser = fn(CommandInvocation<'_>) -> InputCommand;

pub struct Command {
    pub name: &'static str,
    /// Alternate spellings, matched like `name`.
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub help: &'static str,
    pub parser: CommandParser,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

/// Whole-word commands, matched case-insensitively.
pub fn find_command(word: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| {
        command.name.eq_ignore_ascii_case(word)
            || command
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(word))
    })
}

const COMMANDS: &[Command] = &[
    Command {
        name: "quit",
        aliases: &["exit", "bye", "退出", "再见"],
        usage: "quit | exit | bye",
        help: "Save the current persona and leave.",
        parser: super::parse_quit,
    },
    Command {
        name: "clear",
        aliases: &["清空"],
        usage: "clear",
        help: "Forget the in-memory history (the log file is kept).",
        parser: super::parse_clear,
    },
    Command {
        name: "prompt:",
        aliases: &[],
        usage: "prompt:<name>",
        help: "Switch persona; `prompt:list` shows them all.",
        parser: super::parse_prompt,
    },
];
