//! Line-oriented chat loop on stdin/stdout.

use std::error::Error;
use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::commands::{help_lines, parse_input, InputCommand};
use crate::core::chat_stream::ModelService;
use crate::core::config::data::path_display;
use crate::core::conversation::{ConversationDriver, ConversationObserver};
use crate::core::persona::{instruction_preview, PersonaRegistry};
use crate::core::session::SessionState;

const RULE: &str = "==================================================";

/// Prints streamed output straight to the terminal.
struct TerminalObserver;

impl ConversationObserver for TerminalObserver {
    fn reasoning(&mut self, text: &str) {
        println!("\n🧠 [reasoning]: {text}");
        flush_stdout();
    }

    fn answer(&mut self, text: &str) {
        print!("{text}");
        flush_stdout();
    }
}

/// One attempt at reading an operator line.
#[derive(Debug)]
enum LineRead {
    Line(String),
    /// The line could not be decoded; the reader is still usable.
    Unreadable(io::Error),
    Closed,
}

fn interpret_read(read: io::Result<Option<String>>) -> LineRead {
    match read {
        Ok(Some(line)) => LineRead::Line(line),
        Ok(None) => LineRead::Closed,
        Err(err) if err.kind() == io::ErrorKind::InvalidData => LineRead::Unreadable(err),
        Err(err) => {
            warn!(error = %err, "failed to read from stdin");
            LineRead::Closed
        }
    }
}

fn flush_stdout() {
    if let Err(err) = io::stdout().flush() {
        warn!(error = %err, "failed to flush stdout");
    }
}

enum LoopControl {
    Continue,
    Quit,
}

/// How the loop ended, for the goodbye line.
enum ExitReason {
    Quit,
    Interrupted,
    EndOfInput,
}

pub async fn run_chat<S: ModelService>(
    mut driver: ConversationDriver<S>,
) -> Result<(), Box<dyn Error>> {
    print_warnings(driver.session_mut());
    show_welcome(driver.session());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let reason = loop {
        print!("\n😊 你: ");
        flush_stdout();

        let read = tokio::select! {
            read = lines.next_line() => read,
            _ = tokio::signal::ctrl_c() => break ExitReason::Interrupted,
        };
        let line = match interpret_read(read) {
            LineRead::Line(line) => line,
            LineRead::Unreadable(err) => {
                println!("❌ {err}");
                continue;
            }
            LineRead::Closed => break ExitReason::EndOfInput,
        };

        let control = match parse_input(&line) {
            InputCommand::Message(text) => {
                println!();
                print!("🤖 AI: ");
                flush_stdout();
                let mut observer = TerminalObserver;
                let outcome = tokio::select! {
                    outcome = driver.submit(&text, &mut observer) => Some(outcome),
                    _ = tokio::signal::ctrl_c() => None,
                };
                match outcome {
                    Some(Ok(_)) => println!(),
                    Some(Err(err)) => println!("{err}"),
                    // In-flight answers are not salvaged.
                    None => break ExitReason::Interrupted,
                }
                LoopControl::Continue
            }
            command => handle_command(driver.session_mut(), command),
        };
        print_warnings(driver.session_mut());

        if let LoopControl::Quit = control {
            break ExitReason::Quit;
        }
    };

    let session = driver.session_mut();
    session.persist_selection();
    print_warnings(session);
    match reason {
        ExitReason::Quit => println!("\n👋 Goodbye!"),
        ExitReason::Interrupted => println!("\n\n👋 Ctrl+C detected, exiting..."),
        ExitReason::EndOfInput => println!("\n\n👋 Goodbye!"),
    }
    Ok(())
}

fn handle_command(session: &mut SessionState, command: InputCommand) -> LoopControl {
    match command {
        InputCommand::Quit => return LoopControl::Quit,
        InputCommand::Clear => {
            session.clear();
            println!("\n✨ Conversation history cleared\n");
        }
        InputCommand::ListPersonas => {
            print_personas(session.registry(), Some(session.active_persona().name.as_str()));
        }
        InputCommand::SwitchPersona(name) => match session.switch_to(&name) {
            Ok(()) => {
                println!("\n✅ Switched to '{}' persona", session.active_persona().name);
                println!("📁 Conversation log: {}", path_display(session.log_path()));
                match session.history_len() {
                    0 => println!("📚 No history yet\n"),
                    count => println!("📚 Loaded {count} history entries\n"),
                }
            }
            Err(rejection) => {
                println!("❌ {rejection}");
                print_personas(session.registry(), Some(session.active_persona().name.as_str()));
            }
        },
        InputCommand::MissingPersonaName => {
            println!("❌ Please give a persona name, format: prompt:<name>");
            print_personas(session.registry(), Some(session.active_persona().name.as_str()));
        }
        InputCommand::Empty => println!("Please type something..."),
        InputCommand::Message(_) => {}
    }
    LoopControl::Continue
}

pub fn print_personas(registry: &PersonaRegistry, current: Option<&str>) {
    println!("\n📋 Available personas:");
    for persona in registry.all() {
        let status = if Some(persona.name.as_str()) == current {
            " (current)"
        } else {
            ""
        };
        println!(
            "   {}{} - {}",
            persona.name,
            status,
            instruction_preview(&persona.system_instruction)
        );
    }
    println!();
}

fn show_welcome(session: &SessionState) {
    println!("🤖 Chat client started!");
    println!("{RULE}");
    if session.has_log() {
        println!("📚 Loaded {} history entries", session.history_len());
    }
    println!("🎯 Current persona: {}", session.active_persona().name);
    for line in help_lines() {
        println!("💡 {line}");
    }
    println!(
        "💡 Conversation is saved to {}",
        path_display(session.log_path())
    );
    println!("{RULE}");
}

fn print_warnings(session: &mut SessionState) {
    for warning in session.drain_warnings() {
        eprintln!("⚠️ {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn undecodable_line_is_skipped_and_reading_continues() {
        let input: &[u8] = b"caf\xe9\nhello\n";
        let mut lines = BufReader::new(input).lines();

        assert!(matches!(
            interpret_read(lines.next_line().await),
            LineRead::Unreadable(_)
        ));
        match interpret_read(lines.next_line().await) {
            LineRead::Line(line) => assert_eq!(line, "hello"),
            other => panic!("expected a line, got {other:?}"),
        }
        assert!(matches!(
            interpret_read(lines.next_line().await),
            LineRead::Closed
        ));
    }

    #[test]
    fn other_read_errors_end_input() {
        let err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        assert!(matches!(interpret_read(Err(err)), LineRead::Closed));
    }
}
