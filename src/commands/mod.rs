mod registry;

pub use registry::{all_commands, find_command, CommandInvocation};

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Quit,
    Clear,
    ListPersonas,
    SwitchPersona(String),
    /// `prompt:` with nothing after it.
    MissingPersonaName,
    Empty,
    Message(String),
}

const PROMPT_PREFIX: &str = "prompt:";

pub fn parse_input(input: &str) -> InputCommand {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return InputCommand::Empty;
    }

    // `prompt:` takes its argument glued to the prefix.
    if let Some(prefix) = trimmed.get(..PROMPT_PREFIX.len()) {
        if prefix.eq_ignore_ascii_case(PROMPT_PREFIX) {
            let invocation = CommandInvocation {
                args: trimmed[PROMPT_PREFIX.len()..].trim(),
            };
            return parse_prompt(invocation);
        }
    }

    match find_command(trimmed) {
        Some(command) => (command.parser)(CommandInvocation {
            args: "",
        }),
        None => InputCommand::Message(trimmed.to_string()),
    }
}

pub(super) fn parse_quit(_invocation: CommandInvocation<'_>) -> InputCommand {
    InputCommand::Quit
}

pub(super) fn parse_clear(_invocation: CommandInvocation<'_>) -> InputCommand {
    InputCommand::Clear
}

pub(super) fn parse_prompt(invocation: CommandInvocation<'_>) -> InputCommand {
    match invocation.args {
        "" => InputCommand::MissingPersonaName,
        "list" => InputCommand::ListPersonas,
        name => InputCommand::SwitchPersona(name.to_string()),
    }
}

/// One help line per command, for the welcome banner.
pub fn help_lines() -> Vec<String> {
    all_commands()
        .iter()
        .map(|command| format!("{:<22} {}", command.usage, command.help))
        .collect()
}
