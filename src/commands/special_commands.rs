//! Special commands for the assistant chat REPL
//!
//! Commands are prefixed with `/` and are case-insensitive. Anything else is
//! sent to the assistant.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Commands handled by the REPL itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show available commands
    Help,

    /// Reprint the conversation so far
    History,

    /// Show today's calorie and hydration progress
    Status,

    /// Leave the session
    Exit,

    /// Not a special command; send to the assistant
    None,
}

/// Parse a line of REPL input
///
/// # Examples
///
/// ```
/// use fitbot::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/help").unwrap(), SpecialCommand::Help);
/// assert_eq!(parse_special_command("quit").unwrap(), SpecialCommand::Exit);
/// assert_eq!(
///     parse_special_command("how much protein?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/history" => Ok(SpecialCommand::History),
        "/status" => Ok(SpecialCommand::Status),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        input if input.starts_with("/history ") || input.starts_with("/status ") => {
            let mut parts = input.splitn(2, ' ');
            let command = parts.next().unwrap_or(input);
            let arg = parts.next().unwrap_or("").trim();
            Err(CommandError::UnsupportedArgument {
                command: command.to_string(),
                arg: arg.to_string(),
            })
        }

        input => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
FitBot Assistant Commands
=========================

  /help, /?       - Show this help message
  /history        - Show the conversation so far
  /status         - Show today's calorie and hydration progress
  exit, /exit     - Leave the chat (quit and /quit also work)

Anything else is sent to FitBot AI. Commands are case-insensitive.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(parse_special_command("/HELP").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
        assert_eq!(
            parse_special_command(" /history ").unwrap(),
            SpecialCommand::History
        );
        assert_eq!(parse_special_command("/status").unwrap(), SpecialCommand::Status);
        assert_eq!(parse_special_command("Exit").unwrap(), SpecialCommand::Exit);
        assert_eq!(parse_special_command("/quit").unwrap(), SpecialCommand::Exit);
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("what should I eat after leg day?").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(
            parse_special_command("exit strategy for cutting").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_special_command("/mode write"),
            Err(CommandError::UnknownCommand("/mode".to_string()))
        );
    }

    #[test]
    fn test_unsupported_argument() {
        assert_eq!(
            parse_special_command("/status now"),
            Err(CommandError::UnsupportedArgument {
                command: "/status".to_string(),
                arg: "now".to_string(),
            })
        );
    }
}
